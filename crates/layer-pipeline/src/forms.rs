//! Layer creation and time-selection forms.
//!
//! Widgets are out of scope; these types hold the form logic a UI binds to:
//! which options to offer, what a submission produces, and how picker and
//! slider changes become layer updates.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use explorer_common::{
    display_date, normalize_local_picker_input_to_utc_midnight, picker_display_instant,
    to_iso_string, Collection, ExplorerError, ExplorerResult, LayerConfig, LayerId, RenderConfig,
    SliderWindow, TimeseriesType,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::contracts::{CollectionProvider, LayerListStore};

/// Shown instead of the option list for collections that cannot be drawn.
pub const UNSUPPORTED_NOTICE: &str =
    "The collection does not implement the datacube or render STAC extensions.";

/// Field-level message when the form is submitted without an option.
pub const SELECT_OPTION_MESSAGE: &str = "Select a layer option.";

/// Field-level message for an empty or unparseable date.
pub const INVALID_DATE_MESSAGE: &str = "Please select a valid date.";

/// What the render option form shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderOptionView {
    Options {
        collection: String,
        options: Vec<String>,
    },
    Notice {
        collection: String,
        message: String,
    },
}

/// Render option choice for one collection; submission creates a layer.
pub struct RenderOptionSelection<'a> {
    collection: &'a Collection,
}

impl<'a> RenderOptionSelection<'a> {
    pub fn new(collection: &'a Collection) -> Self {
        Self { collection }
    }

    pub fn view(&self) -> RenderOptionView {
        match self.options() {
            Ok(options) => RenderOptionView::Options {
                collection: self.collection.id.clone(),
                options: options.into_iter().map(str::to_string).collect(),
            },
            Err(_) => RenderOptionView::Notice {
                collection: self.collection.id.clone(),
                message: UNSUPPORTED_NOTICE.to_string(),
            },
        }
    }

    /// Render option names, or `CollectionUnsupported` when there are none.
    pub fn options(&self) -> ExplorerResult<Vec<&'a str>> {
        if !self.collection.supports_rendering() {
            return Err(ExplorerError::CollectionUnsupported(
                self.collection.id.clone(),
            ));
        }
        Ok(self.collection.render_options())
    }

    /// Layer config for a submission, with both times at the collection's latest date.
    pub fn build_layer(&self, option: Option<&str>, now: DateTime<Utc>) -> ExplorerResult<LayerConfig> {
        let option = option
            .filter(|o| !o.is_empty())
            .ok_or_else(|| ExplorerError::MissingSelection(SELECT_OPTION_MESSAGE.to_string()))?;
        self.options()?;
        self.collection.render_spec(option)?;

        let latest = to_iso_string(&self.collection.max_date(now));
        Ok(LayerConfig {
            id: LayerId::generate(),
            name: self.collection.id.clone(),
            is_visible: true,
            timeseries_type: self.collection.timeseries_type,
            render_config: RenderConfig {
                collection: self.collection.id.clone(),
                variable: option.to_string(),
                render_option: Some(option.to_string()),
                datetime_str: Some(latest.clone()),
                reference_dt_str: Some(latest),
            },
        })
    }

    /// Build the layer and hand it to the layer list.
    pub async fn submit(
        &self,
        store: &dyn LayerListStore,
        option: Option<&str>,
        now: DateTime<Utc>,
    ) -> ExplorerResult<LayerConfig> {
        let layer = self.build_layer(option, now)?;
        store.add_layer(layer.clone()).await?;
        info!(
            layer_id = %layer.id,
            collection = %self.collection.id,
            render_option = %layer.render_config.variable,
            "Layer created"
        );
        Ok(layer)
    }
}

/// Which time form a layer gets.
pub enum LayerForm {
    Loading,
    NotFound,
    Forecast(ForecastDateForm),
    /// Historical collections have no time form
    None,
}

impl LayerForm {
    pub async fn for_layer(
        provider: &dyn CollectionProvider,
        layer: LayerConfig,
        now: DateTime<Utc>,
    ) -> ExplorerResult<Self> {
        let lookup = provider.lookup(&layer.render_config.collection).await;
        if lookup.is_loading {
            return Ok(LayerForm::Loading);
        }
        let Some(collection) = lookup.collection else {
            return Ok(LayerForm::NotFound);
        };

        match collection.timeseries_type {
            Some(TimeseriesType::Forecast) => Ok(LayerForm::Forecast(ForecastDateForm::new(
                collection, layer, now,
            )?)),
            _ => Ok(LayerForm::None),
        }
    }
}

/// Reference-date picker plus forecast-hour slider for one layer.
///
/// The picker selects the model run (UTC midnight of the picked date); the
/// slider moves the valid time across a 48 hour window from there.
#[derive(Debug, Clone)]
pub struct ForecastDateForm {
    collection: Arc<Collection>,
    layer: LayerConfig,
    slider: SliderWindow,
    max_date: DateTime<Utc>,
}

impl ForecastDateForm {
    pub fn new(
        collection: Arc<Collection>,
        layer: LayerConfig,
        now: DateTime<Utc>,
    ) -> ExplorerResult<Self> {
        let max_date = collection.max_date(now);
        let start = layer.render_config.reference_time()?.unwrap_or(max_date);
        let slider = SliderWindow::forecast(start)?;
        Ok(Self {
            collection,
            layer,
            slider,
            max_date,
        })
    }

    pub fn layer(&self) -> &LayerConfig {
        &self.layer
    }

    pub fn slider(&self) -> &SliderWindow {
        &self.slider
    }

    /// Selectable picker range: the collection's temporal extent.
    pub fn picker_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.collection.min_date(), self.max_date)
    }

    /// Instant to feed a picker rendering in `zone` so it shows the UTC start date.
    pub fn picker_display<Tz: TimeZone>(&self, zone: &Tz) -> DateTime<Utc> {
        picker_display_instant(self.slider.min, zone)
    }

    /// Accessible text for the slider's current value.
    pub fn slider_value_text(&self) -> Option<String> {
        let valid = self.layer.render_config.valid_time().ok().flatten()?;
        display_date(Some(valid.timestamp_millis()))
    }

    /// The picker changed: new run at UTC midnight, valid time reset to it.
    pub async fn on_picker_change<Tz: TimeZone>(
        &mut self,
        store: &dyn LayerListStore,
        value: Option<DateTime<Tz>>,
    ) -> ExplorerResult<LayerConfig> {
        let start = value
            .as_ref()
            .map(normalize_local_picker_input_to_utc_midnight)
            .ok_or_else(invalid_date)?;
        let slider = SliderWindow::forecast(start)?;
        let next = self.layer.with_reference_time(&start);

        store.update_layer(next.clone()).await?;
        debug!(layer_id = %next.id, reference = %to_iso_string(&start), "Forecast run selected");

        self.slider = slider;
        self.layer = next.clone();
        Ok(next)
    }

    /// The slider moved: only the valid time changes.
    pub async fn on_slider_change(
        &mut self,
        store: &dyn LayerListStore,
        value: Option<DateTime<Utc>>,
    ) -> ExplorerResult<LayerConfig> {
        let value = value.ok_or_else(invalid_date)?;
        let next = self.layer.with_valid_time(&self.slider.snap(value));

        store.update_layer(next.clone()).await?;
        debug!(
            layer_id = %next.id,
            valid = next.render_config.datetime_str.as_deref().unwrap_or_default(),
            "Forecast hour selected"
        );

        self.layer = next.clone();
        Ok(next)
    }
}

fn invalid_date() -> ExplorerError {
    ExplorerError::InvalidDate(INVALID_DATE_MESSAGE.to_string())
}
