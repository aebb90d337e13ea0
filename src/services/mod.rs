pub mod state_service;
