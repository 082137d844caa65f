use crate::{
    ApiSettings, CurationSettings, DatabaseSettings, DetectorSettings, LoggingSettings,
    RawSettings, SourceSettings, VisionSettings,
};
use std::path::{PathBuf, absolute};

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub vision: VisionSettings,
    pub curation: CurationSettings,
    pub discovery: DiscoverySettings,
    pub source: SourceSettings,
    pub detector: DetectorSettings,
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub photos_dir: PathBuf,
    pub download_limit: usize,
    pub preload_ahead: usize,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        let photos_dir = absolute(&raw.discovery.photos_dir).expect("Invalid photos_dir");
        let discovery = DiscoverySettings {
            photos_dir,
            download_limit: raw.discovery.download_limit,
            preload_ahead: raw.discovery.preload_ahead,
        };

        Self {
            database: raw.database,
            vision: raw.vision,
            curation: raw.curation,
            discovery,
            source: raw.source,
            detector: raw.detector,
            api: raw.api,
            logging: raw.logging,
        }
    }
}
