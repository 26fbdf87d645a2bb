use notebox::notestore::util::populate_test_data;
use notebox::{FileKeyValueStore, InMemoryKeyValueStore, NoteStore};

#[derive(serde::Deserialize, Debug, Clone)]
pub enum KeyValueStoreType {
    InMemory,
    File,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    kvstoretype: KeyValueStoreType,
    datadir: String,
    storagekey: String,
    quotabytes: Option<usize>,
    pub maximagebytes: usize,
    populateinmemorystore: bool,
    pub staticdir: String,
    pub otlpendpoint: Option<String>,
    pub loglevel: Option<String>,
}

impl Settings {
    pub fn get_note_store(&self) -> NoteStore {
        match self.kvstoretype {
            KeyValueStoreType::InMemory => {
                let kv = match self.quotabytes {
                    Some(quota) => InMemoryKeyValueStore::with_quota(quota),
                    None => InMemoryKeyValueStore::new(),
                };
                let store = NoteStore::with_key(Box::new(kv), self.storagekey.as_str());
                if self.populateinmemorystore {
                    populate_test_data(&store).expect("Failed to populate the in-memory store");
                }
                store
            }
            KeyValueStoreType::File => {
                let kv = FileKeyValueStore::new(&self.datadir, self.quotabytes)
                    .expect("Failed to open the data directory");
                NoteStore::with_key(Box::new(kv), self.storagekey.as_str())
            }
        }
    }
}

lazy_static! {
    pub static ref CONFIGURATION: Settings =
        get_configuration().expect("Failed to read configuration.yml.");
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let config = config::Config::builder()
        .set_default("debug", false)?
        .set_default("host", "localhost")?
        .set_default("port", 8000)?
        .set_default("kvstoretype", "InMemory")?
        .set_default("datadir", "./data")?
        .set_default("storagekey", notebox::notestore::DEFAULT_STORAGE_KEY)?
        .set_default("maximagebytes", 5 * 1024 * 1024)?
        .set_default("populateinmemorystore", false)?
        .set_default("staticdir", "./static")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::default()
                .prefix("notebox")
                .separator("_"),
        )
        .build()?;
    config.try_deserialize()
}
