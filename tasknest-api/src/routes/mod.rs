/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: User endpoints (create, login)
/// - `tasks`: Task endpoints (create, list, fetch, update, delete)
/// - `subtasks`: Subtask endpoints (create, update, delete)

pub mod health;
pub mod subtasks;
pub mod tasks;
pub mod users;
