//! Command handlers organized by action family.
//!
//! | Module | Actions |
//! |--------|---------|
//! | `define` | `define_entity` |
//! | `crud` | `create`, `read`, `update`, `delete` |

pub mod crud;
pub mod define;
