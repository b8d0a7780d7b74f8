//! Store-agnostic domain types.

pub mod category;
pub mod city;
pub mod id;
pub mod model;
pub mod month;
pub mod report;
pub mod store;

pub use category::{Category, UnknownCategory};
pub use city::normalize_city_name;
pub use id::{RestaurantId, UserId, ZoneId};
pub use model::{
    CanonicalModel, LinkedModel, MonthlySales, Restaurant, SalesError, SalesRecord, User, Zone,
    MONTHS_PER_YEAR,
};
pub use month::Month;
pub use report::{Measure, QueryNotFound, QueryOutcome, Report, ReportRow};
pub use store::StoreKind;
