// Main library module for fossfund - a catalogue of free and open source
// projects and the organisations behind them

// Module declarations
pub mod api; // API handlers and routes
pub mod error; // Error handling and error pages
pub mod middleware; // HTTP middleware
pub mod model; // Configuration, application state and response types
pub mod service; // Forms, pagination and logo storage
pub mod startup; // Application startup utilities

pub use model::{AppState, Configuration};
