//! Record type definitions
//!
//! - [`Customer`] - Customers of the shop
//! - [`BowlingBall`] - Customer balls and shop stock
//! - [`DrillSheet`] - Finger-hole layouts, including reusable templates
//! - [`WorkOrder`] - Work performed, with derived labor and total cost
//! - [`Employee`] - Staff, their role and hourly rate
//! - [`Location`] - Centers and counters the shop works from

pub mod ball;
pub mod customer;
pub mod drill_sheet;
pub mod employee;
pub mod location;
pub mod work_order;

pub use ball::{BallStatus, BowlingBall};
pub use customer::Customer;
pub use drill_sheet::{DrillSheet, DrillSheetDocument, GripStyle};
pub use employee::Employee;
pub use location::Location;
pub use work_order::{WorkOrder, WorkType};
