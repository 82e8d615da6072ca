//! Screen implementations. Each screen is a top-level Component.

pub mod devices;
pub mod overview;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Devices, Box::new(devices::DevicesScreen::new())),
        (ScreenId::Overview, Box::new(overview::OverviewScreen::new())),
    ]
}
