#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use retouch_image as image;

#[doc(inline)]
pub use retouch_imgproc as imgproc;

#[doc(inline)]
pub use retouch_io as io;

#[doc(inline)]
pub use retouch_dnn as dnn;

#[doc(inline)]
pub use retouch_pipeline as pipeline;
