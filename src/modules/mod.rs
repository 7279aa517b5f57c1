pub mod config;
pub mod lap_csv;
pub mod store;
pub mod sync;

pub mod models {
    pub mod track;
    pub mod driver;
    pub mod lap_record;

    pub mod general;
}

pub mod helpers {
    pub mod lap_time;
    pub mod tier;
    pub mod slug;

    pub mod math;
    pub mod logging;
}
