// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Safar workspace.
//!
//! Includes the channel-agnostic keyboard model and the [`Action`] callback
//! codec. Actions travel over the wire as compact colon-separated tokens
//! (e.g. `status:app:3:approved`), so the codec must stay stable across
//! releases — persisted messages keep their inline keyboards.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity and display fields of a Telegram user, as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserInfo {
    /// "First Last" when both are known, falling back to whichever is set,
    /// then to the numeric id.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{f} {l}"),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            (None, None) => self.id.to_string(),
        }
    }
}

/// The two live record tables a callback can target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[strum(serialize = "app")]
    App,
    #[strum(serialize = "hotel")]
    Hotel,
}

/// A (table, id) reference to a live record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: i64,
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Fixed room-type vocabulary for hotel bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Single,
    Double,
    Family,
    Luxe,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::Single,
        RoomType::Double,
        RoomType::Family,
        RoomType::Luxe,
    ];

    /// Stored/displayed label, matching the legacy data format.
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::Single => "Одноместный",
            RoomType::Double => "Двухместный",
            RoomType::Family => "Семейный",
            RoomType::Luxe => "Бизнес-люкс",
        }
    }

    /// Button label with the room glyph.
    pub fn button_label(&self) -> &'static str {
        match self {
            RoomType::Single => "🛌 Одноместный",
            RoomType::Double => "🛌🛌 Двухместный",
            RoomType::Family => "👨‍👩‍👧 Семейный",
            RoomType::Luxe => "💼 Бизнес-люкс",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Family => "family",
            RoomType::Luxe => "luxury",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "single" => Some(RoomType::Single),
            "double" => Some(RoomType::Double),
            "family" => Some(RoomType::Family),
            "luxury" => Some(RoomType::Luxe),
            _ => None,
        }
    }
}

/// Which record type a paginated list is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Application,
    Hotel,
}

impl PageKind {
    fn token(&self) -> &'static str {
        match self {
            PageKind::Application => "application",
            PageKind::Hotel => "hotel",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "application" => Some(PageKind::Application),
            "hotel" => Some(PageKind::Hotel),
            _ => None,
        }
    }
}

/// A user-tappable action carried in an inline keyboard button.
///
/// The wire encoding is the legacy colon-separated callback format.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Begin the ticket-application dialogue.
    StartApp,
    /// Begin the hotel-booking dialogue.
    StartHotel,
    /// Show the caller's merged request list.
    MyRequests,
    /// Show the help text.
    Help,
    /// One of the popular-route shortcuts.
    RouteSelect(String),
    /// Switch to free-text route entry.
    RouteCustom,
    /// Round-trip question answer.
    RoundTrip(bool),
    /// Confirm the assembled ticket draft.
    ConfirmApp,
    /// Discard the in-progress draft.
    CancelDraft,
    /// Owner cancels a persisted application.
    CancelApp(i64),
    /// Owner cancels a persisted hotel booking.
    CancelHotel(i64),
    /// Room-type selection, completing the hotel dialogue.
    Room(RoomType),
    /// Jump to a list page (also used as the refresh action).
    Page { kind: PageKind, page: usize },
    /// Open a single application card.
    ViewApp(i64),
    /// Open a single hotel-booking card.
    ViewHotel(i64),
    /// Admin status shortcut; `key` is a canonical status key.
    SetStatus { item: ItemRef, key: String },
    /// Admin opens the comment dialogue for a record.
    Comment(ItemRef),
    /// Admin picked the comment visibility.
    CommentKind { item: ItemRef, public: bool },
    /// Admin abandons the comment dialogue.
    CommentCancel(ItemRef),
    /// Admin requests the raw-field detail view.
    Details(ItemRef),
    /// Admin archives a record.
    Archive(ItemRef),
    /// Admin confirms or aborts wiping the record tables.
    ClearDb(bool),
}

impl Action {
    /// Encode into the callback-data wire format.
    pub fn encode(&self) -> String {
        match self {
            Action::StartApp => "start_app".into(),
            Action::StartHotel => "start_hotel".into(),
            Action::MyRequests => "my_requests".into(),
            Action::Help => "help".into(),
            Action::RouteSelect(route) => format!("route_select:{route}"),
            Action::RouteCustom => "route_custom".into(),
            Action::RoundTrip(true) => "return_yes".into(),
            Action::RoundTrip(false) => "return_no".into(),
            Action::ConfirmApp => "confirm_app".into(),
            Action::CancelDraft => "cancel_app".into(),
            Action::CancelApp(id) => format!("cancel_app:{id}"),
            Action::CancelHotel(id) => format!("cancel_hotel:{id}"),
            Action::Room(room) => format!("room_{}", room.key()),
            Action::Page { kind, page } => format!("page:{}:{page}", kind.token()),
            Action::ViewApp(id) => format!("view_app:{id}"),
            Action::ViewHotel(id) => format!("view_hotel:{id}"),
            Action::SetStatus { item, key } => {
                format!("status:{}:{}:{key}", item.kind, item.id)
            }
            Action::Comment(item) => format!("comment:{}:{}", item.kind, item.id),
            Action::CommentKind { item, public } => format!(
                "comment_type:{}:{}:{}",
                item.kind,
                item.id,
                if *public { "public" } else { "internal" }
            ),
            Action::CommentCancel(item) => {
                format!("comment_cancel:{}:{}", item.kind, item.id)
            }
            Action::Details(item) => format!("details:{}:{}", item.kind, item.id),
            Action::Archive(item) => format!("archive:{}:{}", item.kind, item.id),
            Action::ClearDb(true) => "clear_db_confirm".into(),
            Action::ClearDb(false) => "clear_db_cancel".into(),
        }
    }

    /// Decode callback data. Returns `None` for unrecognized tokens so the
    /// dispatcher can ignore stale buttons from older bot versions.
    pub fn parse(data: &str) -> Option<Action> {
        match data {
            "start_app" | "start_app_again" => return Some(Action::StartApp),
            "start_hotel" => return Some(Action::StartHotel),
            "my_requests" => return Some(Action::MyRequests),
            "help" => return Some(Action::Help),
            "route_custom" => return Some(Action::RouteCustom),
            "return_yes" => return Some(Action::RoundTrip(true)),
            "return_no" => return Some(Action::RoundTrip(false)),
            "confirm_app" => return Some(Action::ConfirmApp),
            "cancel_app" => return Some(Action::CancelDraft),
            "clear_db_confirm" => return Some(Action::ClearDb(true)),
            "clear_db_cancel" => return Some(Action::ClearDb(false)),
            _ => {}
        }

        if let Some(room) = data.strip_prefix("room_") {
            return RoomType::from_key(room).map(Action::Room);
        }
        if let Some(route) = data.strip_prefix("route_select:") {
            return Some(Action::RouteSelect(route.to_string()));
        }
        if let Some(rest) = data.strip_prefix("cancel_app:") {
            return rest.parse().ok().map(Action::CancelApp);
        }
        if let Some(rest) = data.strip_prefix("cancel_hotel:") {
            return rest.parse().ok().map(Action::CancelHotel);
        }
        if let Some(rest) = data.strip_prefix("view_app:") {
            return rest.parse().ok().map(Action::ViewApp);
        }
        if let Some(rest) = data.strip_prefix("view_hotel:") {
            return rest.parse().ok().map(Action::ViewHotel);
        }
        if let Some(rest) = data.strip_prefix("page:") {
            let (kind, page) = rest.split_once(':')?;
            return Some(Action::Page {
                kind: PageKind::from_token(kind)?,
                page: page.parse().ok()?,
            });
        }
        if let Some(rest) = data.strip_prefix("status:") {
            let mut parts = rest.splitn(3, ':');
            let item = parse_item(parts.next()?, parts.next()?)?;
            let key = parts.next()?.to_string();
            return Some(Action::SetStatus { item, key });
        }
        if let Some(rest) = data.strip_prefix("comment_type:") {
            let mut parts = rest.splitn(3, ':');
            let item = parse_item(parts.next()?, parts.next()?)?;
            let public = match parts.next()? {
                "public" => true,
                "internal" => false,
                _ => return None,
            };
            return Some(Action::CommentKind { item, public });
        }
        if let Some(rest) = data.strip_prefix("comment_cancel:") {
            return parse_item_pair(rest).map(Action::CommentCancel);
        }
        if let Some(rest) = data.strip_prefix("comment:") {
            return parse_item_pair(rest).map(Action::Comment);
        }
        if let Some(rest) = data.strip_prefix("details:") {
            return parse_item_pair(rest).map(Action::Details);
        }
        if let Some(rest) = data.strip_prefix("archive:") {
            return parse_item_pair(rest).map(Action::Archive);
        }

        None
    }
}

fn parse_item(kind: &str, id: &str) -> Option<ItemRef> {
    let kind = kind.parse::<ItemKind>().ok()?;
    let id = id.parse::<i64>().ok()?;
    Some(ItemRef::new(kind, id))
}

fn parse_item_pair(rest: &str) -> Option<ItemRef> {
    let (kind, id) = rest.split_once(':')?;
    parse_item(kind, id)
}

/// A single inline-keyboard button: a label plus the action it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Channel-agnostic inline keyboard: rows of buttons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flat iterator over all buttons, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// One record rendered for a report: ordered (label, value) pairs.
#[derive(Debug, Clone, Default)]
pub struct ReportRecord {
    pub fields: Vec<(String, String)>,
}

impl ReportRecord {
    pub fn field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((label.into(), value.into()));
        self
    }
}
