//! Views over an abstract rendering backend
//!
//! Both views implement [`Surface`](crate::annotation::Surface) so the
//! annotation registry can draw on them:
//!
//! - **line**: One sensor against time, value axis
//! - **spatio**: All requested sensors as image rows, categorical axis
//! - **draw_list**: Backend capability and an in-memory backend

pub mod draw_list;
pub mod line;
pub mod spatio;

pub use draw_list::{DrawList, Primitive, RenderBackend};
pub use line::{LineView, DEFAULT_X_SCALE};
pub use spatio::SpatioView;
