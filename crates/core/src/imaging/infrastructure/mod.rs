pub mod box_drawer;
pub mod reference_image_loader;
