use super::super::Model;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use js_sys::Date;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::FileList;
use yew::prelude::*;

/// Local upload time as `YYYYMMDD_HHMMSS`, the same id format the service
/// uses for stored blueprints.
pub fn upload_timestamp() -> String {
    let now = Date::new_0();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date(),
        now.get_hours(),
        now.get_minutes(),
        now.get_seconds()
    )
}

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

pub fn is_blueprint_type(mime: &str) -> bool {
    mime.starts_with("image/") || mime == "application/pdf"
}

/// First blueprint-like file in the list; only one blueprint is analysed at a time.
pub fn first_blueprint_file(file_list: &FileList) -> Option<GlooFile> {
    (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .find(|file| is_blueprint_type(&file.type_()))
        .map(GlooFile::from)
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

/// The single transcription allowed in flight. Each start issues a new
/// ticket; a result is accepted only for the ticket still outstanding.
#[derive(Debug, Default)]
pub struct TranscriptionTicket {
    issued: u64,
    in_flight: Option<u64>,
}

impl TranscriptionTicket {
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn start(&mut self) -> u64 {
        self.issued += 1;
        self.in_flight = Some(self.issued);
        self.issued
    }

    pub fn cancel(&mut self) {
        self.in_flight = None;
    }

    /// Clears the slot and returns true when `ticket` is the outstanding one.
    pub fn finish(&mut self, ticket: u64) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_for_outstanding_ticket_is_accepted_once() {
        let mut transcription = TranscriptionTicket::default();
        let ticket = transcription.start();

        assert!(transcription.is_busy());
        assert!(transcription.finish(ticket));
        assert!(!transcription.is_busy());
        assert!(!transcription.finish(ticket));
    }

    #[test]
    fn result_arriving_after_reset_is_dropped() {
        let mut transcription = TranscriptionTicket::default();
        let old = transcription.start();
        transcription.cancel();

        assert!(!transcription.finish(old));
    }

    #[test]
    fn result_from_before_reset_cannot_fill_the_next_session() {
        let mut transcription = TranscriptionTicket::default();
        let old = transcription.start();
        transcription.cancel();
        let current = transcription.start();

        assert!(!transcription.finish(old));
        assert!(transcription.is_busy());
        assert!(transcription.finish(current));
    }
}
