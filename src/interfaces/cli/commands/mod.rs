mod config_gen;
mod rankings;
mod seed;

pub use config_gen::config_generate;
pub use rankings::{
    rebuild_ranking, record_donation, show_city_context, show_city_statistics,
    show_global_statistics, show_top_cities,
};
pub use seed::{SAMPLE_CITIES, seed_demo_data};
