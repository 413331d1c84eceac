pub mod colorpicker;

pub use colorpicker::ColorPicker;
