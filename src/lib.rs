//! Construction-planning console: CRUD over work programs, tasks, task
//! details and daily progress, plus progress charts and a filterable report.

pub mod aggregate;
pub mod api;
pub mod export;
pub mod logging;
pub mod model;
pub mod state;
pub mod view;
