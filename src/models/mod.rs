pub mod activity;
pub mod catalog;
pub mod dashboard;
pub mod doctor;
pub mod enums;
pub mod order;
pub mod patient;
pub mod settings;
pub mod sql;

pub use activity::*;
pub use catalog::*;
pub use dashboard::*;
pub use doctor::*;
pub use enums::*;
pub use order::*;
pub use patient::*;
pub use settings::*;
pub use sql::*;
