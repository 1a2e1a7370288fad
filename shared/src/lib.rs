pub mod date_range;
pub mod element;
pub mod payload;

pub use date_range::{
    DATE_RANGE_OPTIONS, DateRangeError, DateRangeOption, HeatmapFilter, RelativeDate,
};
pub use element::{ActionStep, CountedElement, ElementRef, RowLabel};
pub use payload::{HeatmapPayload, PayloadElement};
