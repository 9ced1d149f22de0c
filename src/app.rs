//! Application state and the weather aggregation orchestrator
//!
//! [`App`] is the single owner of all UI-visible state. Background work
//! (debounce timers, autocomplete requests, aggregation chains, favorites
//! prefetches) runs in spawned tasks that never touch state directly: each
//! reports its outcome over an mpsc channel, and the owner drains that
//! channel once per event-loop tick. Every message carries the counter
//! value it was started under (search generation, chain id, or summaries
//! epoch), so results of superseded work are recognized and dropped no
//! matter what order completions arrive in.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cli::StartupConfig;
use crate::data::{
    parse_weather, Coordinate, LocationPrediction, WeatherApi, WeatherSnapshot,
    CURRENT_LOCATION_LABEL,
};
use crate::favorites::{Favorites, StringListStore};
use crate::search::{SearchController, DEBOUNCE_DELAY};

/// Capacity of the completion channel; drained every tick, so it only has
/// to absorb one tick's worth of completions
const CHANNEL_CAPACITY: usize = 32;

/// The screen currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Free-text city search with the prediction dropdown
    Search,
    /// Current conditions, forecast table, and temperature chart
    Detail,
    /// Stored favorites with prefetched summaries
    Favorites,
}

/// Messages sent from background tasks to the state owner
#[derive(Debug)]
pub enum AppMessage {
    /// A debounce timer ran out
    DebounceElapsed { generation: u64 },
    /// An autocomplete request finished
    PredictionsLoaded {
        generation: u64,
        result: Result<Vec<LocationPrediction>, String>,
    },
    /// An aggregation chain reached its terminal outcome
    ChainFinished {
        chain: u64,
        result: Result<WeatherSnapshot, String>,
    },
    /// A favorites summary batch finished
    SummariesLoaded {
        epoch: u64,
        summaries: Vec<FavoriteSummary>,
    },
}

/// One favorites-screen row: the stored name and its prefetched weather
#[derive(Debug, Clone)]
pub struct FavoriteSummary {
    pub name: String,
    pub weather: Option<WeatherSnapshot>,
}

/// Main application struct owning state and the API handle
pub struct App {
    /// Current screen
    pub screen: Screen,
    /// Search input text
    pub query: String,
    /// Predictions for the current query
    pub predictions: Vec<LocationPrediction>,
    /// Index of the highlighted prediction
    pub selected_prediction: usize,
    /// Whether an autocomplete request is in flight
    pub searching: bool,
    /// The currently displayed weather, if any
    pub weather: Option<WeatherSnapshot>,
    /// Whether an aggregation chain is in flight (drives the spinner)
    pub loading: bool,
    /// Transient status line, cleared on the next key press
    pub status: Option<String>,
    /// Favorite cities
    pub favorites: Favorites,
    /// Prefetched weather per favorite, in favorites order
    pub summaries: Vec<FavoriteSummary>,
    /// Index of the highlighted favorite
    pub selected_favorite: usize,
    /// Flag to show the help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Scroll offset for the forecast table
    pub forecast_scroll: u16,
    /// Whether the temperature chart is expanded in the detail view
    pub chart_expanded: bool,
    /// Debounce and stale-result tracking for the search box
    search: SearchController,
    /// Id of the most recently started aggregation chain
    chain: u64,
    /// Epoch of the most recently requested summaries batch
    summaries_epoch: u64,
    /// Coordinate standing in for a device GPS fix, if configured
    device_location: Option<Coordinate>,
    /// City to fetch immediately on startup, if configured
    initial_city: Option<String>,
    /// Backend API handle
    api: Arc<dyn WeatherApi>,
    /// Completion channel drained by [`App::poll_messages`]
    messages: mpsc::Receiver<AppMessage>,
    sender: mpsc::Sender<AppMessage>,
}

impl App {
    /// Creates the app with the given API handle, favorites store, and
    /// startup configuration
    pub fn new(
        api: Arc<dyn WeatherApi>,
        store: Option<StringListStore>,
        config: StartupConfig,
    ) -> Self {
        let (sender, messages) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            screen: Screen::Search,
            query: String::new(),
            predictions: Vec::new(),
            selected_prediction: 0,
            searching: false,
            weather: None,
            loading: false,
            status: None,
            favorites: Favorites::load(store),
            summaries: Vec::new(),
            selected_favorite: 0,
            show_help: false,
            should_quit: false,
            forecast_scroll: 0,
            chart_expanded: false,
            search: SearchController::new(),
            chain: 0,
            summaries_epoch: 0,
            device_location: config.device_location,
            initial_city: config.initial_city,
            api,
            messages,
            sender,
        }
    }

    /// Runs the startup fetch the CLI asked for, if any
    ///
    /// `--city` wins over `--location`; with neither, the app opens on an
    /// idle search screen.
    pub fn bootstrap(&mut self) {
        if let Some(city) = self.initial_city.take() {
            self.fetch_city(city);
        } else if self.device_location.is_some() {
            self.request_device_weather();
        }
    }

    /// Whether the displayed snapshot's city is in the favorites list
    pub fn displayed_is_favorite(&self) -> bool {
        self.weather
            .as_ref()
            .is_some_and(|w| self.favorites.contains(&w.display_name))
    }

    // ------------------------------------------------------------------
    // Keyboard handling
    // ------------------------------------------------------------------

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - Search: printable keys edit the query, `Up`/`Down` select a
    ///   prediction, `Enter` fetches it, `Ctrl-L` uses the configured
    ///   location, `Tab` opens favorites, `Esc` clears (quits when empty)
    /// - Detail: `f` toggles favorite, `c` toggles the chart, `Up`/`Down`
    ///   scroll the forecast, `s`/`Esc` back to search, `q` quits
    /// - Favorites: `Enter` fetches, `d` removes, `Esc`/`Tab` goes back
    /// - `F1` shows help anywhere; `Ctrl-C` quits anywhere
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Help overlay swallows every key
        if self.show_help {
            self.show_help = false;
            return;
        }

        // A fresh interaction retires the previous status line
        self.status = None;

        if key_event.code == KeyCode::F(1) {
            self.show_help = true;
            return;
        }

        match self.screen {
            Screen::Search => self.handle_search_key(key_event),
            Screen::Detail => self.handle_detail_key(key_event),
            Screen::Favorites => self.handle_favorites_key(key_event),
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc => {
                if self.query.is_empty() {
                    self.should_quit = true;
                } else {
                    self.query.clear();
                    self.on_query_changed();
                }
            }
            KeyCode::Tab => self.open_favorites(),
            KeyCode::Enter => self.select_prediction(),
            KeyCode::Up => self.move_prediction_up(),
            KeyCode::Down => self.move_prediction_down(),
            KeyCode::Backspace => {
                self.query.pop();
                self.on_query_changed();
            }
            KeyCode::Char('l') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_device_weather();
            }
            KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.push(c);
                self.on_query_changed();
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('s') => {
                self.reset_detail_view_state();
                self.screen = Screen::Search;
            }
            KeyCode::Tab => self.open_favorites(),
            KeyCode::Char('f') => self.toggle_favorite(),
            KeyCode::Char('c') => self.chart_expanded = !self.chart_expanded,
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_favorites_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Tab => {
                self.screen = if self.weather.is_some() {
                    Screen::Detail
                } else {
                    Screen::Search
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_favorite_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_favorite_down(),
            KeyCode::Enter => self.fetch_selected_favorite(),
            KeyCode::Char('d') => self.remove_selected_favorite(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Search: debounce wiring
    // ------------------------------------------------------------------

    /// Reacts to an edit of the query text
    ///
    /// Non-empty text schedules a debounce timer under a fresh generation;
    /// empty text cancels everything outstanding and clears the dropdown
    /// immediately, issuing no request.
    fn on_query_changed(&mut self) {
        self.selected_prediction = 0;
        if self.query.is_empty() {
            self.search.cancel();
            self.predictions.clear();
            self.searching = false;
            return;
        }
        let generation = self.search.schedule();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_DELAY).await;
            let _ = sender.send(AppMessage::DebounceElapsed { generation }).await;
        });
    }

    fn on_debounce_elapsed(&mut self, generation: u64) {
        if !self.search.should_fire(generation) {
            debug!("debounce timer {generation} superseded, not firing");
            return;
        }
        let query = self.query.clone();
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        self.searching = true;
        tokio::spawn(async move {
            let result = api.autocomplete(&query).await.map_err(|e| e.to_string());
            let _ = sender
                .send(AppMessage::PredictionsLoaded { generation, result })
                .await;
        });
    }

    fn on_predictions_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<LocationPrediction>, String>,
    ) {
        if !self.search.complete(generation) {
            debug!("discarding stale autocomplete result for generation {generation}");
            return;
        }
        self.searching = false;
        self.selected_prediction = 0;
        match result {
            Ok(predictions) => self.predictions = predictions,
            Err(err) => {
                warn!("autocomplete failed: {err}");
                self.predictions.clear();
            }
        }
    }

    // ------------------------------------------------------------------
    // Aggregation chains
    // ------------------------------------------------------------------

    /// Starts a new chain, superseding any chain still in flight
    ///
    /// Clears the previously displayed weather and raises the spinner.
    /// Returns the id the chain's terminal message must carry.
    fn begin_chain(&mut self) -> u64 {
        self.chain += 1;
        self.loading = true;
        self.weather = None;
        self.reset_detail_view_state();
        self.chain
    }

    /// Starts the by-prediction chain for the highlighted prediction
    ///
    /// Any outstanding autocomplete is cancelled and its hint cleared; its
    /// response, if one still arrives, is discarded as stale.
    pub fn select_prediction(&mut self) {
        let Some(prediction) = self.predictions.get(self.selected_prediction).cloned() else {
            return;
        };
        self.query = prediction.description.clone();
        self.predictions.clear();
        self.selected_prediction = 0;
        self.search.cancel();
        self.searching = false;

        let chain = self.begin_chain();
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = resolve_prediction(api.as_ref(), &prediction).await;
            let _ = sender.send(AppMessage::ChainFinished { chain, result }).await;
        });
    }

    /// Starts the by-coordinate chain against the configured location
    pub fn request_device_weather(&mut self) {
        let Some(coordinate) = self.device_location else {
            self.status = Some("No device location configured (start with --location)".to_string());
            return;
        };
        let chain = self.begin_chain();
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = resolve_coordinate(api.as_ref(), coordinate).await;
            let _ = sender.send(AppMessage::ChainFinished { chain, result }).await;
        });
    }

    /// Starts the by-stored-name chain used for favorites and `--city`
    pub fn fetch_city(&mut self, name: String) {
        let chain = self.begin_chain();
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = resolve_city(api.as_ref(), &name).await;
            let _ = sender.send(AppMessage::ChainFinished { chain, result }).await;
        });
    }

    fn on_chain_finished(&mut self, chain: u64, result: Result<WeatherSnapshot, String>) {
        if chain != self.chain {
            debug!("discarding result of superseded chain {chain}");
            return;
        }
        self.loading = false;
        match result {
            Ok(snapshot) => {
                self.weather = Some(snapshot);
                self.screen = Screen::Detail;
            }
            // Terminal failure: spinner is gone, displayed state untouched
            Err(err) => warn!("weather aggregation failed: {err}"),
        }
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Switches to the favorites screen and prefetches its summaries
    pub fn open_favorites(&mut self) {
        self.screen = Screen::Favorites;
        self.selected_favorite = 0;
        self.refresh_summaries();
    }

    /// Requests a fresh summaries batch under a new epoch
    fn refresh_summaries(&mut self) {
        self.summaries_epoch += 1;
        let epoch = self.summaries_epoch;
        let names: Vec<String> = self.favorites.names().to_vec();
        self.summaries = names
            .iter()
            .map(|name| FavoriteSummary {
                name: name.clone(),
                weather: None,
            })
            .collect();
        if names.is_empty() {
            return;
        }
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let fetches = names.iter().map(|name| resolve_city(api.as_ref(), name));
            let results = futures::future::join_all(fetches).await;
            let summaries = names
                .iter()
                .zip(results)
                .map(|(name, result)| FavoriteSummary {
                    name: name.clone(),
                    weather: result.ok(),
                })
                .collect();
            let _ = sender
                .send(AppMessage::SummariesLoaded { epoch, summaries })
                .await;
        });
    }

    fn on_summaries_loaded(&mut self, epoch: u64, summaries: Vec<FavoriteSummary>) {
        if epoch != self.summaries_epoch {
            debug!("discarding stale favorites summaries for epoch {epoch}");
            return;
        }
        self.summaries = summaries;
    }

    /// Adds or removes the displayed city from favorites
    pub fn toggle_favorite(&mut self) {
        let Some(weather) = &self.weather else {
            return;
        };
        if weather.is_current_location() {
            self.status = Some("Current location cannot be favorited".to_string());
            return;
        }
        let city = weather.display_name.clone();
        if self.favorites.contains(&city) {
            self.favorites.remove(&city);
            self.status = Some(format!("{city} removed from favorites"));
        } else {
            self.favorites.add(city.clone());
            self.status = Some(format!("{city} added to favorites"));
        }
    }

    /// Re-fetches weather for the highlighted favorite
    pub fn fetch_selected_favorite(&mut self) {
        if let Some(name) = self.favorites.get(self.selected_favorite) {
            self.fetch_city(name.to_string());
        }
    }

    /// Removes the highlighted favorite from the list
    pub fn remove_selected_favorite(&mut self) {
        let Some(name) = self
            .favorites
            .get(self.selected_favorite)
            .map(str::to_string)
        else {
            return;
        };
        self.favorites.remove(&name);
        self.summaries.retain(|summary| summary.name != name);
        // Invalidate any batch prefetched for the old list
        self.summaries_epoch += 1;
        if self.selected_favorite >= self.favorites.len() && !self.favorites.is_empty() {
            self.selected_favorite = self.favorites.len() - 1;
        }
        self.status = Some(format!("{name} removed from favorites"));
    }

    // ------------------------------------------------------------------
    // Message pump and selection movement
    // ------------------------------------------------------------------

    /// Applies every pending background completion
    ///
    /// Called once per event-loop tick, after input handling; nothing else
    /// mutates state from outside the owner.
    pub fn poll_messages(&mut self) {
        while let Ok(message) = self.messages.try_recv() {
            self.apply(message);
        }
    }

    fn apply(&mut self, message: AppMessage) {
        match message {
            AppMessage::DebounceElapsed { generation } => self.on_debounce_elapsed(generation),
            AppMessage::PredictionsLoaded { generation, result } => {
                self.on_predictions_loaded(generation, result)
            }
            AppMessage::ChainFinished { chain, result } => self.on_chain_finished(chain, result),
            AppMessage::SummariesLoaded { epoch, summaries } => {
                self.on_summaries_loaded(epoch, summaries)
            }
        }
    }

    /// Moves the prediction highlight up, wrapping at the top
    fn move_prediction_up(&mut self) {
        let count = self.predictions.len();
        if count == 0 {
            return;
        }
        if self.selected_prediction == 0 {
            self.selected_prediction = count - 1;
        } else {
            self.selected_prediction -= 1;
        }
    }

    /// Moves the prediction highlight down, wrapping at the bottom
    fn move_prediction_down(&mut self) {
        let count = self.predictions.len();
        if count == 0 {
            return;
        }
        self.selected_prediction = (self.selected_prediction + 1) % count;
    }

    /// Moves the favorite highlight up, wrapping at the top
    fn move_favorite_up(&mut self) {
        let count = self.favorites.len();
        if count == 0 {
            return;
        }
        if self.selected_favorite == 0 {
            self.selected_favorite = count - 1;
        } else {
            self.selected_favorite -= 1;
        }
    }

    /// Moves the favorite highlight down, wrapping at the bottom
    fn move_favorite_down(&mut self) {
        let count = self.favorites.len();
        if count == 0 {
            return;
        }
        self.selected_favorite = (self.selected_favorite + 1) % count;
    }

    /// Scrolls the forecast table up, stopping at the top
    pub fn scroll_up(&mut self) {
        self.forecast_scroll = self.forecast_scroll.saturating_sub(1);
    }

    /// Scrolls the forecast table down, clamped to the forecast length
    pub fn scroll_down(&mut self) {
        let max = self
            .weather
            .as_ref()
            .map(|w| u16::try_from(w.forecast.len().saturating_sub(1)).unwrap_or(u16::MAX))
            .unwrap_or(0);
        if self.forecast_scroll < max {
            self.forecast_scroll += 1;
        }
    }

    /// Resets scroll position and chart expansion when leaving the detail
    /// view or starting a new chain
    fn reset_detail_view_state(&mut self) {
        self.forecast_scroll = 0;
        self.chart_expanded = false;
    }
}

/// The by-prediction chain body: geocode, fetch, parse, label
async fn resolve_prediction(
    api: &dyn WeatherApi,
    prediction: &LocationPrediction,
) -> Result<WeatherSnapshot, String> {
    let coordinate = api
        .geocode(&prediction.place_id)
        .await
        .map_err(|e| e.to_string())?;
    let document = api
        .fetch_weather(coordinate)
        .await
        .map_err(|e| e.to_string())?;
    let mut snapshot = parse_weather(&document);
    snapshot.display_name = prediction.description.clone();
    Ok(snapshot)
}

/// The by-coordinate chain body: no geocoding, fixed display label
async fn resolve_coordinate(
    api: &dyn WeatherApi,
    coordinate: Coordinate,
) -> Result<WeatherSnapshot, String> {
    let document = api
        .fetch_weather(coordinate)
        .await
        .map_err(|e| e.to_string())?;
    let mut snapshot = parse_weather(&document);
    snapshot.display_name = CURRENT_LOCATION_LABEL.to_string();
    Ok(snapshot)
}

/// The by-stored-name chain body: autocomplete the name, take the first
/// candidate, then geocode and fetch. The snapshot keeps the stored name,
/// not the provider's description.
async fn resolve_city(api: &dyn WeatherApi, name: &str) -> Result<WeatherSnapshot, String> {
    let predictions = api.autocomplete(name).await.map_err(|e| e.to_string())?;
    let Some(first) = predictions.first() else {
        return Err(format!("no location found for {name}"));
    };
    let coordinate = api
        .geocode(&first.place_id)
        .await
        .map_err(|e| e.to_string())?;
    let document = api
        .fetch_weather(coordinate)
        .await
        .map_err(|e| e.to_string())?;
    let mut snapshot = parse_weather(&document);
    snapshot.display_name = name.to_string();
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::api::testing::{prediction, weather_document, FakeApi};
    use std::collections::HashMap;
    use std::time::Duration;

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(api: Arc<FakeApi>) -> App {
        App::new(api, None, StartupConfig::default())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
    }

    /// Lets spawned tasks run and drains the channel under the paused clock
    async fn settle(app: &mut App) {
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.poll_messages();
        }
    }

    // ========================================================================
    // Debounce behavior
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_issue_single_request_for_final_text() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([(
                "LA ".to_string(),
                vec![prediction("Los Angeles, CA, USA", "la-1")],
            )]),
            ..Default::default()
        });
        let mut app = test_app(api.clone());

        app.handle_key(key_event(KeyCode::Char('L')));
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.handle_key(key_event(KeyCode::Char('A')));
        tokio::time::sleep(Duration::from_millis(350)).await;
        // The tick that sees the third keystroke handles input before it
        // drains timer messages, so the older timers are already superseded
        app.handle_key(key_event(KeyCode::Char(' ')));
        app.poll_messages();
        assert_eq!(api.autocomplete_count(), 0);

        // Just short of the final timer: still nothing
        tokio::time::sleep(Duration::from_millis(299)).await;
        app.poll_messages();
        assert_eq!(api.autocomplete_count(), 0);

        settle(&mut app).await;
        assert_eq!(api.autocomplete_count(), 1);
        assert_eq!(api.calls(), vec!["autocomplete:LA ".to_string()]);
        assert_eq!(app.predictions.len(), 1);
        assert!(!app.searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptying_the_query_cancels_the_pending_request() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([(
                "Lo".to_string(),
                vec![prediction("London, UK", "lon-1")],
            )]),
            ..Default::default()
        });
        let mut app = test_app(api.clone());

        type_text(&mut app, "Lo");
        tokio::time::sleep(Duration::from_millis(100)).await;
        app.handle_key(key_event(KeyCode::Backspace));
        app.handle_key(key_event(KeyCode::Backspace));

        assert!(app.predictions.is_empty());
        assert!(!app.searching);

        tokio::time::sleep(Duration::from_millis(400)).await;
        settle(&mut app).await;
        assert_eq!(api.autocomplete_count(), 0);
        assert!(app.predictions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_autocomplete_result_is_discarded() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([
                ("Lon".to_string(), vec![prediction("Lons-le-Saunier, France", "lons-1")]),
                ("London".to_string(), vec![prediction("London, UK", "lon-1")]),
            ]),
            autocomplete_delays: HashMap::from([
                // The older request takes far longer than the newer one
                ("Lon".to_string(), Duration::from_millis(500)),
                ("London".to_string(), Duration::from_millis(50)),
            ]),
            ..Default::default()
        });
        let mut app = test_app(api.clone());

        type_text(&mut app, "Lon");
        tokio::time::sleep(Duration::from_millis(310)).await;
        app.poll_messages();
        // Yield so the spawned request actually starts
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.autocomplete_count(), 1);
        assert!(app.searching);

        type_text(&mut app, "don");
        tokio::time::sleep(Duration::from_millis(310)).await;
        app.poll_messages();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.autocomplete_count(), 2);

        // The newer response lands first and is applied
        settle(&mut app).await;
        assert_eq!(app.predictions, vec![prediction("London, UK", "lon-1")]);

        // The older response lands afterwards and must change nothing
        tokio::time::sleep(Duration::from_millis(500)).await;
        settle(&mut app).await;
        assert_eq!(app.predictions, vec![prediction("London, UK", "lon-1")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selecting_a_prediction_clears_the_in_flight_search_hint() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([
                ("Se".to_string(), vec![prediction("Seattle, WA, USA", "sea-1")]),
                ("Sea".to_string(), vec![prediction("Searcy, AR, USA", "sear-1")]),
            ]),
            autocomplete_delays: HashMap::from([("Sea".to_string(), Duration::from_millis(500))]),
            weather_document: weather_document(61.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());

        type_text(&mut app, "Se");
        tokio::time::sleep(Duration::from_millis(310)).await;
        settle(&mut app).await;
        assert_eq!(app.predictions.len(), 1);

        // The next keystroke's request is slow, so Enter lands mid-flight
        app.handle_key(key_event(KeyCode::Char('a')));
        tokio::time::sleep(Duration::from_millis(310)).await;
        app.poll_messages();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.autocomplete_count(), 2);
        assert!(app.searching);

        app.handle_key(key_event(KeyCode::Enter));
        assert!(!app.searching);

        // The cancelled request's response arrives later and changes nothing
        tokio::time::sleep(Duration::from_millis(500)).await;
        settle(&mut app).await;
        assert!(!app.searching);
        assert!(app.predictions.is_empty());
        assert_eq!(app.screen, Screen::Detail);
    }

    // ========================================================================
    // Aggregation chains
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_full_pipeline_from_typing_to_detail_screen() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([(
                "Seattle".to_string(),
                vec![prediction("Seattle, WA, USA", "sea-1")],
            )]),
            weather_document: weather_document(61.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());

        type_text(&mut app, "Seattle");
        tokio::time::sleep(Duration::from_millis(310)).await;
        settle(&mut app).await;
        assert_eq!(app.predictions.len(), 1);

        app.handle_key(key_event(KeyCode::Enter));
        assert!(app.loading);
        settle(&mut app).await;

        assert!(!app.loading);
        assert_eq!(app.screen, Screen::Detail);
        let weather = app.weather.as_ref().expect("weather should be published");
        assert_eq!(weather.display_name, "Seattle, WA, USA");
        assert!((weather.temperature - 61.0).abs() < 0.01);
        assert_eq!(weather.forecast.len(), 1);
        assert_eq!(
            api.calls(),
            vec![
                "autocomplete:Seattle".to_string(),
                "geocode:sea-1".to_string(),
                "weather:47.6062,-122.3321".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_geocode_failure_clears_spinner_and_publishes_nothing() {
        let api = Arc::new(FakeApi {
            fail_geocode: true,
            ..Default::default()
        });
        let mut app = test_app(api.clone());
        app.predictions = vec![prediction("Seattle, WA, USA", "sea-1")];

        app.handle_key(key_event(KeyCode::Enter));
        assert!(app.loading);
        settle(&mut app).await;

        assert!(!app.loading);
        assert!(app.weather.is_none());
        assert_eq!(app.screen, Screen::Search);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_chain_result_cannot_overwrite_newer_chain() {
        let api = Arc::new(FakeApi {
            geocode_delays: HashMap::from([
                ("slow-place".to_string(), Duration::from_millis(500)),
                ("fast-place".to_string(), Duration::from_millis(10)),
            ]),
            weather_document: weather_document(50.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());

        app.predictions = vec![prediction("Aberdeen, UK", "slow-place")];
        app.handle_key(key_event(KeyCode::Enter));
        app.predictions = vec![prediction("Boston, MA, USA", "fast-place")];
        app.handle_key(key_event(KeyCode::Enter));

        settle(&mut app).await;
        let weather = app.weather.as_ref().expect("newer chain should publish");
        assert_eq!(weather.display_name, "Boston, MA, USA");

        // The slow chain finishes long after; its snapshot must be dropped
        tokio::time::sleep(Duration::from_millis(600)).await;
        settle(&mut app).await;
        let weather = app.weather.as_ref().expect("weather should remain");
        assert_eq!(weather.display_name, "Boston, MA, USA");
        assert!(!app.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_chain_cannot_clear_newer_chains_spinner() {
        let api = Arc::new(FakeApi {
            geocode_delays: HashMap::from([
                ("fast-place".to_string(), Duration::from_millis(10)),
                ("slow-place".to_string(), Duration::from_millis(500)),
            ]),
            weather_document: weather_document(50.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());

        app.predictions = vec![prediction("Aberdeen, UK", "fast-place")];
        app.handle_key(key_event(KeyCode::Enter));
        app.predictions = vec![prediction("Oslo, Norway", "slow-place")];
        app.handle_key(key_event(KeyCode::Enter));

        // The first chain has finished, but the second is still in flight:
        // the spinner stays up
        settle(&mut app).await;
        assert!(app.loading);
        assert!(app.weather.is_none());

        tokio::time::sleep(Duration::from_millis(600)).await;
        settle(&mut app).await;
        assert!(!app.loading);
        let weather = app.weather.as_ref().expect("slow chain should publish");
        assert_eq!(weather.display_name, "Oslo, Norway");
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_flow_skips_geocoding_and_uses_fixed_label() {
        let api = Arc::new(FakeApi {
            weather_document: weather_document(72.5),
            ..Default::default()
        });
        let config = StartupConfig {
            device_location: Some(Coordinate {
                latitude: 34.05,
                longitude: -118.24,
            }),
            initial_city: None,
        };
        let mut app = App::new(api.clone(), None, config);

        app.request_device_weather();
        settle(&mut app).await;

        let weather = app.weather.as_ref().expect("weather should be published");
        assert_eq!(weather.display_name, CURRENT_LOCATION_LABEL);
        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(api.calls(), vec!["weather:34.05,-118.24".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_flow_without_configured_location() {
        let api = Arc::new(FakeApi::default());
        let mut app = test_app(api.clone());

        app.request_device_weather();
        settle(&mut app).await;

        assert!(!app.loading);
        assert!(app.weather.is_none());
        assert!(app.status.as_deref().is_some_and(|s| s.contains("--location")));
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bootstrap_fetches_initial_city_under_its_stored_name() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([(
                "Oslo".to_string(),
                vec![prediction("Oslo, Norway", "oslo-1")],
            )]),
            weather_document: weather_document(41.0),
            ..Default::default()
        });
        let config = StartupConfig {
            device_location: None,
            initial_city: Some("Oslo".to_string()),
        };
        let mut app = App::new(api.clone(), None, config);

        app.bootstrap();
        settle(&mut app).await;

        let weather = app.weather.as_ref().expect("weather should be published");
        // The stored name is kept, not the provider description
        assert_eq!(weather.display_name, "Oslo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_by_name_chain_with_no_predictions_fails_silently() {
        let api = Arc::new(FakeApi::default());
        let mut app = test_app(api.clone());

        app.fetch_city("Nowhereville".to_string());
        settle(&mut app).await;

        assert!(!app.loading);
        assert!(app.weather.is_none());
        // The chain stopped before geocoding
        assert_eq!(api.calls(), vec!["autocomplete:Nowhereville".to_string()]);
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_toggle_favorite_adds_then_removes() {
        let api = Arc::new(FakeApi {
            weather_document: weather_document(61.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());
        app.predictions = vec![prediction("Seattle, WA, USA", "sea-1")];
        app.handle_key(key_event(KeyCode::Enter));
        settle(&mut app).await;
        assert_eq!(app.screen, Screen::Detail);

        app.handle_key(key_event(KeyCode::Char('f')));
        assert!(app.favorites.contains("Seattle, WA, USA"));
        assert!(app.status.as_deref().is_some_and(|s| s.contains("added")));

        app.handle_key(key_event(KeyCode::Char('f')));
        assert!(!app.favorites.contains("Seattle, WA, USA"));
        assert!(app.status.as_deref().is_some_and(|s| s.contains("removed")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_location_is_not_favoritable() {
        let api = Arc::new(FakeApi {
            weather_document: weather_document(72.5),
            ..Default::default()
        });
        let config = StartupConfig {
            device_location: Some(Coordinate {
                latitude: 34.05,
                longitude: -118.24,
            }),
            initial_city: None,
        };
        let mut app = App::new(api.clone(), None, config);
        app.request_device_weather();
        settle(&mut app).await;

        app.handle_key(key_event(KeyCode::Char('f')));
        assert!(app.favorites.is_empty());
        assert!(app.status.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_favorites_prefetches_summaries() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([
                ("Oslo".to_string(), vec![prediction("Oslo, Norway", "oslo-1")]),
                ("Cairo".to_string(), vec![prediction("Cairo, Egypt", "cai-1")]),
            ]),
            weather_document: weather_document(55.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());
        app.favorites.add("Oslo");
        app.favorites.add("Cairo");

        app.open_favorites();
        assert_eq!(app.screen, Screen::Favorites);
        // Placeholders appear immediately
        assert_eq!(app.summaries.len(), 2);
        assert!(app.summaries.iter().all(|s| s.weather.is_none()));

        settle(&mut app).await;
        assert_eq!(app.summaries.len(), 2);
        assert!(app.summaries.iter().all(|s| s.weather.is_some()));
        assert_eq!(app.summaries[0].name, "Oslo");
        assert_eq!(app.summaries[1].name, "Cairo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_summaries_batch_is_discarded_after_removal() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([
                ("Oslo".to_string(), vec![prediction("Oslo, Norway", "oslo-1")]),
                ("Cairo".to_string(), vec![prediction("Cairo, Egypt", "cai-1")]),
            ]),
            autocomplete_delays: HashMap::from([
                ("Oslo".to_string(), Duration::from_millis(200)),
                ("Cairo".to_string(), Duration::from_millis(200)),
            ]),
            weather_document: weather_document(55.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());
        app.favorites.add("Oslo");
        app.favorites.add("Cairo");

        app.open_favorites();
        // Remove Oslo while its batch is still in flight
        app.handle_key(key_event(KeyCode::Char('d')));
        assert_eq!(app.favorites.names(), ["Cairo".to_string()]);
        assert_eq!(app.summaries.len(), 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        settle(&mut app).await;

        // The batch for the old two-entry list never lands
        assert_eq!(app.summaries.len(), 1);
        assert_eq!(app.summaries[0].name, "Cairo");
        assert!(app.summaries[0].weather.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_on_favorite_refetches_it() {
        let api = Arc::new(FakeApi {
            predictions: HashMap::from([(
                "Oslo".to_string(),
                vec![prediction("Oslo, Norway", "oslo-1")],
            )]),
            weather_document: weather_document(41.0),
            ..Default::default()
        });
        let mut app = test_app(api.clone());
        app.favorites.add("Oslo");
        app.screen = Screen::Favorites;

        app.handle_key(key_event(KeyCode::Enter));
        assert!(app.loading);
        settle(&mut app).await;

        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(
            app.weather.as_ref().map(|w| w.display_name.as_str()),
            Some("Oslo")
        );
    }

    // ========================================================================
    // Key handling and screen state
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_typing_updates_query() {
        let mut app = test_app(Arc::new(FakeApi::default()));

        type_text(&mut app, "Oslo");
        assert_eq!(app.query, "Oslo");

        app.handle_key(key_event(KeyCode::Backspace));
        assert_eq!(app.query, "Osl");
    }

    #[tokio::test(start_paused = true)]
    async fn test_esc_clears_query_before_quitting() {
        let mut app = test_app(Arc::new(FakeApi::default()));

        type_text(&mut app, "Oslo");
        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.query, "");
        assert!(!app.should_quit);

        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_screen() {
        for screen in [Screen::Search, Screen::Detail, Screen::Favorites] {
            let mut app = test_app(Arc::new(FakeApi::default()));
            app.screen = screen;
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert!(app.should_quit, "ctrl-c should quit from {screen:?}");
        }
    }

    #[test]
    fn test_tab_opens_favorites_screen() {
        let mut app = test_app(Arc::new(FakeApi::default()));
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.screen, Screen::Favorites);
    }

    #[test]
    fn test_help_overlay_opens_and_any_key_closes() {
        let mut app = test_app(Arc::new(FakeApi::default()));

        app.handle_key(key_event(KeyCode::F(1)));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Char('x')));
        assert!(!app.show_help);
        // The keystroke was swallowed, not typed into the query
        assert_eq!(app.query, "");
    }

    #[test]
    fn test_detail_keys_toggle_chart_and_scroll() {
        let mut app = test_app(Arc::new(FakeApi::default()));
        app.screen = Screen::Detail;
        app.weather = Some({
            let document = weather_document(61.0);
            let mut snapshot = parse_weather(&document);
            snapshot.display_name = "Seattle, WA, USA".to_string();
            snapshot
        });

        app.handle_key(key_event(KeyCode::Char('c')));
        assert!(app.chart_expanded);

        // One forecast day: no room to scroll in either direction
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.forecast_scroll, 0);
        app.handle_key(key_event(KeyCode::Up));
        assert_eq!(app.forecast_scroll, 0);

        // Leaving the screen resets detail view state
        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Search);
        assert!(!app.chart_expanded);
    }

    #[test]
    fn test_favorite_selection_wraps() {
        let mut app = test_app(Arc::new(FakeApi::default()));
        app.favorites.add("Aberdeen, UK");
        app.favorites.add("Boston, MA, USA");
        app.favorites.add("Cairo, Egypt");
        app.screen = Screen::Favorites;

        app.handle_key(key_event(KeyCode::Up));
        assert_eq!(app.selected_favorite, 2);
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_favorite, 0);
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_favorite, 1);
    }

    #[test]
    fn test_esc_from_favorites_returns_to_detail_when_weather_shown() {
        let mut app = test_app(Arc::new(FakeApi::default()));
        app.screen = Screen::Favorites;

        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Search);

        app.screen = Screen::Favorites;
        app.weather = Some({
            let mut snapshot = parse_weather(&weather_document(61.0));
            snapshot.display_name = "Seattle, WA, USA".to_string();
            snapshot
        });
        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Detail);
    }
}
