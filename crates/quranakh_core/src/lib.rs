pub mod access;
pub mod coordinates;
pub mod highlight;
pub mod ports;
pub mod sketch;

pub use access::{can_mark, can_mark_student, can_view_student, AccessError, Profile, Role};
pub use coordinates::{to_pixel, to_relative, validate, CoordinateSpace, Dimensions, Point};
pub use highlight::{
    check_page, color_for_category, page_progress, progress_by_page, Highlight, HighlightColor,
    HighlightError, MistakeCategory, NewHighlight, PageProgress,
};
pub use ports::{DatabaseService, PortError, PortResult};
pub use sketch::{
    to_pixel_document, to_relative_document, PixelSketch, SketchDocument, Stroke, StrokeAttributes,
};
