//! eframe application shell hosting the mood board widget

use std::cell::RefCell;
use std::rc::Rc;

use crate::decode::SelectedFile;
use crate::ingest;
use crate::widget::MoodBoardWidget;
use crate::MoodBoardCallbacks;

/// The egui application for one board
pub struct MoodBoardApp {
    widget: Rc<RefCell<MoodBoardWidget>>,
    callbacks: Rc<RefCell<MoodBoardCallbacks>>,
    /// Revision last reported through `onStateChange`
    reported_revision: u64,
}

impl MoodBoardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        widget: Rc<RefCell<MoodBoardWidget>>,
        callbacks: Rc<RefCell<MoodBoardCallbacks>>,
    ) -> Self {
        Self {
            widget,
            callbacks,
            reported_revision: 0,
        }
    }

    /// Notify JS if the board changed since the last report
    fn report_state_change(&mut self) {
        let (revision, snapshot) = {
            let widget = self.widget.borrow();
            (widget.board().revision(), widget.board().snapshot())
        };
        if revision == self.reported_revision {
            return;
        }
        self.reported_revision = revision;

        // The handler may re-register or clear callbacks, so no borrow is held during the call
        let Some(callback) = crate::cloned_callback(&self.callbacks, |callbacks| callbacks.on_state_change.as_ref())
        else {
            return;
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                let state = js_sys::JSON::parse(&json).unwrap_or_else(|_| wasm_bindgen::JsValue::from_str(&json));
                if let Err(err) = callback.call1(&wasm_bindgen::JsValue::NULL, &state) {
                    log::error!("onStateChange callback failed: {:?}", err);
                }
            }
            Err(err) => log::error!("could not serialize board state: {}", err),
        }
    }
}

/// Ingest files dropped on the canvas without blocking the frame
pub fn spawn_ingest(widget: Rc<RefCell<MoodBoardWidget>>, files: Vec<SelectedFile>, ctx: egui::Context) {
    let loader = {
        let mut widget = widget.borrow_mut();
        widget.board_mut().begin_loading();
        widget.loader().clone()
    };

    wasm_bindgen_futures::spawn_local(async move {
        let images = ingest::ingest_batch(&files, &loader).await;
        widget.borrow_mut().board_mut().finish_loading(Ok(images));
        ctx.request_repaint();
    });
}

impl eframe::App for MoodBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dropped = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let mut widget = self.widget.borrow_mut();
                let available = ui.available_size();
                widget.show(ui, available);
                widget.take_dropped_files()
            })
            .inner;

        if !dropped.is_empty() {
            log::debug!("{} files dropped on the board", dropped.len());
            spawn_ingest(self.widget.clone(), dropped, ctx.clone());
        }

        self.report_state_change();

        // Request continuous repaints so JS-driven changes show up promptly
        ctx.request_repaint();
    }
}
