//! Application state machine and event dispatcher.

use std::{path::PathBuf, sync::Arc};

use casedesk_core::{
  case::{Case, CaseDetail, CaseId},
  store::BreakdownRow,
  vocab::ModelTier,
  wire::{ChatRequest, DashboardSummary},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::{
  client::{ApiClient, CaseQuery},
  export,
  form::{self, CaseForm, FormField},
};

/// Updates fetched when opening a case from the Cases tab.
pub const DETAIL_HISTORY: usize = 1000;

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Chat,
  NewCase,
  Dashboard,
  Cases,
}

impl Tab {
  pub const ALL: [Self; 4] = [Self::Chat, Self::NewCase, Self::Dashboard, Self::Cases];

  pub fn title(self) -> &'static str {
    match self {
      Self::Chat => "Chat",
      Self::NewCase => "New Case",
      Self::Dashboard => "Dashboard",
      Self::Cases => "Cases",
    }
  }

  fn index(self) -> usize {
    Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
  }

  fn step(self, forward: bool) -> Self {
    let n = Self::ALL.len();
    let i = self.index();
    Self::ALL[if forward { (i + 1) % n } else { (i + n - 1) % n }]
  }
}

// ─── Chat log ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
  User,
  Assistant { ok: bool },
}

#[derive(Debug, Clone)]
pub struct ChatLine {
  pub speaker: Speaker,
  pub text:    String,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub tab: Tab,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Where `x` writes CSV exports.
  pub export_dir: PathBuf,

  // Chat
  pub chat_log:   Vec<ChatLine>,
  pub chat_input: String,
  pub tier:       ModelTier,

  // New case
  pub form: CaseForm,

  // Dashboard
  pub summary:          Option<DashboardSummary>,
  pub breakdown:        Vec<BreakdownRow>,
  pub breakdown_scroll: usize,

  // Cases
  pub cases:         Vec<Case>,
  pub query:         CaseQuery,
  pub search:        String,
  pub search_active: bool,
  pub list_cursor:   usize,
  pub detail:        Option<CaseDetail>,
  pub detail_scroll: usize,

  /// Set when the server's data may have changed since the last fetch.
  stale: bool,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient, export_dir: PathBuf) -> Self {
    Self {
      tab: Tab::Chat,
      status_msg: String::new(),
      export_dir,
      chat_log: Vec::new(),
      chat_input: String::new(),
      tier: ModelTier::default(),
      form: CaseForm::default(),
      summary: None,
      breakdown: Vec::new(),
      breakdown_scroll: 0,
      cases: Vec::new(),
      query: CaseQuery::default(),
      search: String::new(),
      search_active: false,
      list_cursor: 0,
      detail: None,
      detail_scroll: 0,
      stale: true,
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the dashboard and the case list.
  pub async fn refresh(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    let result = self.fetch_all().await;
    match &result {
      Ok(()) => {
        self.stale = false;
        self.status_msg.clear();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
    result
  }

  async fn fetch_all(&mut self) -> anyhow::Result<()> {
    self.summary = Some(self.client.dashboard().await?);
    self.breakdown = self.client.breakdown().await?;
    self.load_cases().await
  }

  async fn load_cases(&mut self) -> anyhow::Result<()> {
    self.cases = self.client.list_cases(&self.query).await?;
    self.list_cursor = 0;
    Ok(())
  }

  async fn refresh_if_stale(&mut self) {
    if self.stale {
      // Failures are already shown in the status bar.
      let _ = self.refresh().await;
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Cases whose seller name or id matches the search string.
  pub fn filtered_cases(&self) -> Vec<&Case> {
    if self.search.is_empty() {
      return self.cases.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .cases
      .iter()
      .filter(|c| {
        matcher.fuzzy_match(&c.seller_name, &self.search).is_some()
          || matcher
            .fuzzy_match(c.case_id.as_str(), &self.search)
            .is_some()
      })
      .collect()
  }

  pub fn cursor_case(&self) -> Option<&Case> {
    self.filtered_cases().get(self.list_cursor).copied()
  }

  /// `true` when printable keys are input rather than commands.
  pub fn accepts_text(&self) -> bool {
    match self.tab {
      Tab::Chat => true,
      Tab::NewCase => {
        let field = self.form.current();
        !field.is_choice() && field != FormField::Submit
      }
      Tab::Cases => self.search_active,
      Tab::Dashboard => false,
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match key.code {
      KeyCode::Tab => return self.switch_tab(self.tab.step(true)).await,
      KeyCode::BackTab => return self.switch_tab(self.tab.step(false)).await,
      KeyCode::F(2) => {
        self.tier = form::cycle(self.tier, true);
        self.status_msg = format!("Model tier: {}", self.tier);
        return Ok(true);
      }
      KeyCode::Char(c @ '1'..='4') if !self.accepts_text() => {
        let i = c as usize - '1' as usize;
        return self.switch_tab(Tab::ALL[i]).await;
      }
      _ => {}
    }

    match self.tab {
      Tab::Chat => self.handle_chat_key(key).await,
      Tab::NewCase => self.handle_form_key(key).await,
      Tab::Dashboard => self.handle_dashboard_key(key).await,
      Tab::Cases if self.search_active => Ok(self.handle_search_key(key)),
      Tab::Cases if self.detail.is_some() => Ok(self.handle_detail_key(key)),
      Tab::Cases => self.handle_list_key(key).await,
    }
  }

  async fn switch_tab(&mut self, tab: Tab) -> anyhow::Result<bool> {
    self.tab = tab;
    self.status_msg.clear();
    if matches!(tab, Tab::Dashboard | Tab::Cases) {
      self.refresh_if_stale().await;
    }
    Ok(true)
  }

  // ── Chat ──────────────────────────────────────────────────────────────────

  async fn handle_chat_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => self.chat_input.clear(),
      KeyCode::Backspace => {
        self.chat_input.pop();
      }
      KeyCode::Enter => self.send_chat().await,
      KeyCode::Char(c) => self.chat_input.push(c),
      _ => {}
    }
    Ok(true)
  }

  async fn send_chat(&mut self) {
    let message = self.chat_input.trim().to_owned();
    if message.is_empty() {
      return;
    }
    self.chat_input.clear();
    self.chat_log.push(ChatLine {
      speaker: Speaker::User,
      text:    message.clone(),
    });

    self.status_msg = format!("Thinking ({})…", self.tier);
    let request = ChatRequest {
      message,
      tier: Some(self.tier),
    };
    let line = match self.client.chat(&request).await {
      Ok(reply) => {
        if reply.case_id.is_some() {
          self.stale = true;
        }
        ChatLine {
          speaker: Speaker::Assistant { ok: reply.ok },
          text:    reply.text,
        }
      }
      Err(e) => ChatLine {
        speaker: Speaker::Assistant { ok: false },
        text:    format!("❌ {e}"),
      },
    };
    self.chat_log.push(line);
    self.status_msg.clear();
  }

  // ── New case ──────────────────────────────────────────────────────────────

  async fn handle_form_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Down => self.form.next(),
      KeyCode::Up => self.form.prev(),
      KeyCode::Left => self.form.cycle_current(false),
      KeyCode::Right => self.form.cycle_current(true),
      KeyCode::Backspace => self.form.backspace(),
      KeyCode::Enter if self.form.current() == FormField::Submit => {
        self.submit_form().await;
      }
      KeyCode::Enter => self.form.next(),
      KeyCode::Esc => {
        self.form = CaseForm::default();
        self.status_msg = "Form cleared".into();
      }
      KeyCode::Char(c) => self.form.push_char(c),
      _ => {}
    }
    Ok(true)
  }

  async fn submit_form(&mut self) {
    let input = match self.form.to_new_case() {
      Ok(input) => input,
      Err(e) => {
        self.status_msg = format!("❌ {e:#}");
        return;
      }
    };
    match self.client.create_case(&input).await {
      Ok(case) => {
        self.status_msg = format!("✅ Created {} for {}", case.case_id, case.seller_name);
        self.form = CaseForm::default();
        self.stale = true;
      }
      Err(e) => self.status_msg = format!("❌ {e:#}"),
    }
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  async fn handle_dashboard_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char('r') => {
        let _ = self.refresh().await;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        if self.breakdown_scroll + 1 < self.breakdown.len() {
          self.breakdown_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.breakdown_scroll = self.breakdown_scroll.saturating_sub(1);
      }
      _ => {}
    }
    Ok(true)
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  fn handle_search_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search.clear();
      }
      KeyCode::Enter => self.search_active = false,
      KeyCode::Backspace => {
        self.search.pop();
      }
      KeyCode::Char(c) => self.search.push(c),
      _ => return true,
    }
    self.list_cursor = 0;
    true
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.filtered_cases().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // Filters
      KeyCode::Char('s') => {
        self.query.case_status = form::cycle_filter(self.query.case_status);
        self.reload_list().await;
      }
      KeyCode::Char('m') => {
        self.query.marketplace = form::cycle_filter(self.query.marketplace);
        self.reload_list().await;
      }
      KeyCode::Char('p') => {
        self.query.priority = form::cycle_filter(self.query.priority);
        self.reload_list().await;
      }
      KeyCode::Char('c') => {
        self.query = CaseQuery::default();
        self.search.clear();
        self.reload_list().await;
      }
      KeyCode::Char('/') => {
        self.search_active = true;
        self.search.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('r') => {
        let _ = self.refresh().await;
      }

      // Detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_case().map(|c| c.case_id.clone()) {
          self.open_detail(&id).await;
        }
      }

      // Export
      KeyCode::Char('x') => self.export().await,

      _ => {}
    }
    Ok(true)
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.detail = None;
        self.detail_scroll = 0;
      }
      KeyCode::Down | KeyCode::Char('j') => self.detail_scroll += 1,
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }
      _ => {}
    }
    true
  }

  async fn reload_list(&mut self) {
    if let Err(e) = self.load_cases().await {
      self.status_msg = format!("Error: {e}");
    }
  }

  async fn open_detail(&mut self, id: &CaseId) {
    self.status_msg = "Loading…".into();
    match self.client.get_case(id, DETAIL_HISTORY).await {
      Ok(detail) => {
        self.detail = Some(detail);
        self.detail_scroll = 0;
        self.status_msg.clear();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  async fn export(&mut self) {
    let result = match self.client.export_csv(&self.query).await {
      Ok(body) => export::write_export(&self.export_dir, &body),
      Err(e) => Err(e),
    };
    self.status_msg = match result {
      Ok(path) => format!("Exported to {}", path.display()),
      Err(e) => format!("❌ {e:#}"),
    };
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use casedesk_core::case::NewCase;
  use chrono::Utc;

  use super::*;
  use crate::client::ApiConfig;

  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
      timeout:  Duration::from_secs(1),
    })
    .unwrap();
    let mut app = App::new(client, std::env::temp_dir());
    app.cases = [(1, "Acme Corporation"), (2, "Global Retailers Inc"), (3, "Tech Solutions Ltd")]
      .into_iter()
      .map(|(n, name)| {
        NewCase::new(name, "Auth").into_case(CaseId::from_seq(n), 12345, Utc::now())
      })
      .collect();
    app
  }

  fn press(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  #[test]
  fn search_matches_seller_or_id() {
    let mut app = app();
    app.search = "glob".into();
    let hits: Vec<_> = app.filtered_cases().iter().map(|c| c.case_id.as_str()).collect();
    assert_eq!(hits, ["CASE-0002"]);

    app.search = "0003".into();
    assert_eq!(app.filtered_cases().len(), 1);
  }

  #[tokio::test]
  async fn digits_type_into_chat_but_switch_elsewhere() {
    let mut app = app();
    app.handle_key(press(KeyCode::Char('3'))).await.unwrap();
    assert_eq!(app.tab, Tab::Chat);
    assert_eq!(app.chat_input, "3");

    app.tab = Tab::NewCase;
    app.form.cursor = FormField::ALL
      .iter()
      .position(|f| *f == FormField::Priority)
      .unwrap();
    app.stale = false;
    app.handle_key(press(KeyCode::Char('1'))).await.unwrap();
    assert_eq!(app.tab, Tab::Chat);
  }

  #[tokio::test]
  async fn f2_cycles_tier() {
    let mut app = app();
    assert_eq!(app.tier, ModelTier::Balanced);
    app.handle_key(press(KeyCode::F(2))).await.unwrap();
    assert_eq!(app.tier, ModelTier::Smart);
  }

  #[tokio::test]
  async fn search_mode_captures_keys() {
    let mut app = app();
    app.tab = Tab::Cases;
    app.handle_key(press(KeyCode::Char('/'))).await.unwrap();
    for c in "tech".chars() {
      app.handle_key(press(KeyCode::Char(c))).await.unwrap();
    }
    assert_eq!(app.search, "tech");
    assert_eq!(app.filtered_cases().len(), 1);

    app.handle_key(press(KeyCode::Esc)).await.unwrap();
    assert!(!app.search_active);
    assert_eq!(app.filtered_cases().len(), 3);
  }

  #[tokio::test]
  async fn q_quits_from_cases() {
    let mut app = app();
    app.tab = Tab::Cases;
    assert!(!app.handle_key(press(KeyCode::Char('q'))).await.unwrap());
  }
}
