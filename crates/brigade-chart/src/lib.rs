//! Brigade Chart — the organization services built on the repository
//! traits: the org chart (positions, departments, titles, members) and
//! the training catalog (channels, courses, quiz attempts).
//!
//! Every chart write reloads the organization's chart and returns it
//! alongside the result as a [`Reconciled`] value.

pub mod config;
pub mod error;
pub mod service;
pub mod snapshot;
pub mod training;

pub use config::ChartConfig;
pub use error::ChartError;
pub use service::{NewDepartment, NewPosition, OrgChartService};
pub use snapshot::{ChartSnapshot, ChartView, DepartmentChart, Reconciled};
pub use training::{Attempt, NewChannel, NewCourse, TrainingService};
