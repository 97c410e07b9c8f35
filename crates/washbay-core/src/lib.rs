pub mod app_config;
pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod ports;
pub mod search;
pub mod seed;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{load_app_config, load_app_config_from_env, stores_path_from_env};
pub use error::{ConfigError, RepositoryError, SearchError, ValidationError};
pub use geo::{haversine_km, Coordinates, EtaModel, EARTH_RADIUS_KM};
pub use ports::{ProximityQuery, StoreListQuery, StoreRepository};
pub use search::{
    search_stores, NearbyStore, PriceMatch, SearchCriteria, SearchEnvelope, SearchSettings,
};
pub use seed::{load_stores_file, StoresFile};
pub use stores::{
    DayHours, NewStore, ServiceOffering, Store, StorePatch, WeeklyHours, MAX_RATING,
};
