//! Laboratory domain rules shared by the service and the client:
//! code mapping and order lifecycle, reference ranges, patient helpers,
//! list filtering, dashboard trends and the SQL console guard.

pub mod dashboard;
pub mod lifecycle;
pub mod patient;
pub mod reference;
pub mod search;
pub mod sql_guard;
