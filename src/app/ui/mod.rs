pub mod help;
pub mod input_box;
pub mod loading;
pub mod notice;
pub mod question;
pub mod scroll;
pub mod settings;
pub mod sidebar;
pub mod textarea;
pub mod transcript;
pub mod utils;

pub use input_box::{InputBox, InputOutcome};
pub use loading::Loading;
pub use notice::Notice;
pub use question::{Answer, Question};
pub use scroll::Scroll;
pub use settings::{SettingsOutcome, SettingsScreen};
pub use sidebar::Sidebar;
pub use textarea::MessageInput;
pub use transcript::Transcript;

use ratatui::{
    style::{Color, Modifier, Style},
    widgets::Block,
};

pub trait Dim {
    fn dim_bg(&mut self);
}

impl Dim for ratatui::Frame<'_> {
    fn dim_bg(&mut self) {
        self.render_widget(
            Block::default().style(
                Style::default()
                    .bg(Color::Rgb(0, 0, 0))
                    .add_modifier(Modifier::DIM),
            ),
            self.area(),
        );
    }
}
