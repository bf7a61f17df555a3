//! Frame composition: sidebar on the left, title bar / transcript / input
//! stacked on the right, search overlay on top when open.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{SearchPopup, Sidebar, TitleBar, Transcript};

const SIDEBAR_WIDTH: u16 = 30;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let [sidebar_area, main_area] =
        Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(frame.area());
    let [title_area, transcript_area, input_area] =
        Layout::vertical([Length(1), Min(0), Length(3)]).areas(main_area);

    Sidebar {
        threads: &app.threads,
        active_thread: &app.active_thread,
        focused: tui.sidebar_focused() && tui.search.is_none(),
        state: &mut tui.sidebar,
    }
    .render(frame, sidebar_area);

    TitleBar {
        version_label: app.version.label(),
        status_message: app.status_message.clone(),
        role: app.role,
    }
    .render(frame, title_area);

    Transcript {
        turns: &app.transcript,
        reveal_frame: app.reveal.as_ref().map(|r| r.frame()),
        generating: app.generating,
        new_chat: app.new_chat,
        spinner_frame,
        state: &mut tui.transcript,
    }
    .render(frame, transcript_area);

    tui.input.generating = app.generating;
    tui.input.render(frame, input_area);

    if let Some(search) = &mut tui.search {
        SearchPopup {
            threads: &app.threads,
            state: search,
        }
        .render(frame, frame.area());
    }
}
