use crate::feed::{FeedFilter, PredictionFeed};
use crate::prediction::{score_fraction, Prediction, Tier};
use crate::supabase::FeedEvent;
use crate::ticker::ticker_line;
use eframe::egui;
use std::sync::mpsc::Receiver;

const EMPTY_MESSAGE: &str = "No predictions yet — waiting for the scorer.";

pub struct DashboardApp {
    pub feed: PredictionFeed,
    pub filter: FeedFilter,
    events: Option<Receiver<FeedEvent>>,
    loaded: bool,
}

impl DashboardApp {
    pub fn new(events: Receiver<FeedEvent>) -> Self {
        Self {
            feed: PredictionFeed::new(),
            filter: FeedFilter::All,
            events: Some(events),
            loaded: false,
        }
    }

    /// App without a data source, used by tests that drive the feed directly.
    pub fn detached() -> Self {
        Self {
            feed: PredictionFeed::new(),
            filter: FeedFilter::All,
            events: None,
            loaded: false,
        }
    }

    /// Apply all events queued by the worker threads.
    pub fn drain_events(&mut self) {
        let Some(rx) = &self.events else { return };
        // Collect first; applying while iterating would borrow self twice.
        let pending: Vec<FeedEvent> = rx.try_iter().collect();
        for event in pending {
            self.apply_event(event);
        }
    }

    pub fn apply_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(rows) => {
                self.feed.replace(rows);
                self.loaded = true;
            }
            FeedEvent::Insert(row) => {
                tracing::debug!(
                    "realtime insert: {} ({})",
                    row.title.as_deref().unwrap_or("(untitled)"),
                    row.tier.label()
                );
                self.feed.push_front(row);
            }
        }
    }

    fn header_ui(&self, ui: &mut egui::Ui) {
        let stats = self.feed.stats();
        ui.horizontal(|ui| {
            ui.heading("👁 veye");
            ui.separator();
            stat_box(ui, "Tracked", stats.total, egui::Color32::WHITE);
            stat_box(ui, "Critical", stats.critical, Tier::Critical.color());
            stat_box(ui, "Viral", stats.viral, Tier::Viral.color());
            stat_box(ui, "Pre-viral", stats.pre_viral, Tier::PreViral.color());
        });
    }

    fn filter_bar_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.selectable_value(&mut self.filter, FeedFilter::All, "All");
            for tier in Tier::ALL {
                ui.selectable_value(&mut self.filter, FeedFilter::Tier(tier), tier.label());
            }
            ui.selectable_value(&mut self.filter, FeedFilter::CrossSignal, "⚡ Cross-signal");
        });
    }

    fn cards_ui(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            for p in self.feed.filtered(self.filter) {
                prediction_card(ui, p);
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.header_ui(ui);
            self.filter_bar_ui(ui);
        });

        egui::TopBottomPanel::bottom("ticker").show(ctx, |ui| {
            let line = ticker_line(self.feed.rows());
            if line.is_empty() {
                ui.weak("—");
            } else {
                ui.add(egui::Label::new(line).truncate(true));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.feed.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.weak(if self.loaded {
                        EMPTY_MESSAGE
                    } else {
                        "Loading predictions…"
                    });
                });
            } else {
                self.cards_ui(ui);
            }
        });
    }
}

fn stat_box(ui: &mut egui::Ui, label: &str, value: usize, color: egui::Color32) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.vertical(|ui| {
            ui.colored_label(color, egui::RichText::new(value.to_string()).strong());
            ui.small(label);
        });
    });
}

fn prediction_card(ui: &mut egui::Ui, p: &Prediction) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.colored_label(p.tier.color(), p.tier.label());
            ui.strong(p.platform.to_uppercase());
            if let Some(author) = &p.author {
                ui.weak(format!("@{author}"));
            }
            if p.cross_platform {
                ui.label("⚡");
            }
            if let Some(at) = p.scored_at {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(at.format("%H:%M:%S").to_string());
                });
            }
        });

        let title = p.title.as_deref().unwrap_or("(untitled)");
        match &p.clip_url {
            Some(url) => {
                ui.hyperlink_to(title, url);
            }
            None => {
                ui.label(title);
            }
        }

        score_bar(ui, "AI", p.ai_score);
        score_bar(ui, "Platform", p.platform_score);
        score_bar(ui, "Final", p.final_score);
    });
}

fn score_bar(ui: &mut egui::Ui, label: &str, score: f32) {
    ui.horizontal(|ui| {
        ui.add_sized([60.0, 0.0], egui::Label::new(egui::RichText::new(label).small()));
        ui.add(
            egui::ProgressBar::new(score_fraction(score))
                .desired_width(220.0)
                .text(format!("{score:.0}")),
        );
    });
}
