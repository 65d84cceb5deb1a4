use crate::comments::CommentStore;
use crate::config::Config;
use crate::location::{
    CoordinateResolver, Gazetteer, GazetteerError, NominatimSuggester, OpenCageProvider,
};
use crate::registration::RegistrationStore;
use std::sync::Arc;

pub struct AppState {
    pub resolver: CoordinateResolver,
    pub store: RegistrationStore,
    pub comments: CommentStore,
    pub suggester: NominatimSuggester,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, GazetteerError> {
        Ok(Self {
            resolver: build_resolver(config)?,
            store: RegistrationStore::open(config.data_file.clone()),
            comments: CommentStore::open(config.comments_file.clone()),
            suggester: NominatimSuggester::new(config.suggest_url.clone(), config.geocoder_timeout),
        })
    }
}

/// Resolver wired from config: optional external gazetteer, optional provider.
pub fn build_resolver(config: &Config) -> Result<CoordinateResolver, GazetteerError> {
    let mut resolver = CoordinateResolver::new(config.resolver);

    if let Some(path) = &config.gazetteer_path {
        let table = Gazetteer::from_path(path)?;
        tracing::info!(path = %path.display(), entries = table.len(), "loaded gazetteer");
        resolver = resolver.with_gazetteer(Arc::new(table));
    }

    match &config.opencage_api_key {
        Some(key) => {
            tracing::info!(url = %config.geocoder_url, "live geocoding enabled");
            let provider = OpenCageProvider::new(
                key.clone(),
                config.geocoder_url.clone(),
                config.geocoder_timeout,
            );
            resolver = resolver.with_provider(Arc::new(provider));
        }
        None => tracing::info!("no OPENCAGE_API_KEY set, resolving from gazetteer only"),
    }

    Ok(resolver)
}
