pub mod feed;
pub mod gui;
pub mod logging;
pub mod prediction;
pub mod settings;
pub mod supabase;
pub mod ticker;
