//! Input events and modifier-key policies

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use crossterm::event::{
    KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use smallvec::SmallVec;

use crate::error::ActionError;

/// The four modifier keys an action binding can whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Alt,
    Shift,
    Meta,
    Ctrl,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Alt,
        Modifier::Shift,
        Modifier::Meta,
        Modifier::Ctrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
            Modifier::Ctrl => "ctrl",
        }
    }
}

impl FromStr for Modifier {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alt" | "option" => Ok(Modifier::Alt),
            "shift" => Ok(Modifier::Shift),
            "meta" | "cmd" | "command" | "super" => Ok(Modifier::Meta),
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            other => Err(ActionError::InvalidAllowedKeys(format!(
                "unknown modifier '{other}'"
            ))),
        }
    }
}

/// Which modifier keys were held when an event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub ctrl: bool,
}

impl ModifierState {
    pub fn is_pressed(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Alt => self.alt,
            Modifier::Shift => self.shift,
            Modifier::Meta => self.meta,
            Modifier::Ctrl => self.ctrl,
        }
    }

    pub fn set(&mut self, modifier: Modifier, pressed: bool) {
        match modifier {
            Modifier::Alt => self.alt = pressed,
            Modifier::Shift => self.shift = pressed,
            Modifier::Meta => self.meta = pressed,
            Modifier::Ctrl => self.ctrl = pressed,
        }
    }

    pub fn any(&self) -> bool {
        self.alt || self.shift || self.meta || self.ctrl
    }
}

impl From<KeyModifiers> for ModifierState {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
            meta: mods.intersects(KeyModifiers::SUPER | KeyModifiers::META),
            ctrl: mods.contains(KeyModifiers::CONTROL),
        }
    }
}

/// Pointer button that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
}

impl From<MouseButton> for PointerButton {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Middle => PointerButton::Auxiliary,
            MouseButton::Right => PointerButton::Secondary,
        }
    }
}

/// Modifier-key policy of a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowedKeys {
    /// Defer to the default policy (simple clicks only for pointer events).
    #[default]
    Unset,

    /// Any combination of modifiers is accepted.
    Any,

    /// Only the listed modifiers may be held.
    Keys(SmallVec<[Modifier; 4]>),
}

impl AllowedKeys {
    pub fn none() -> Self {
        AllowedKeys::Keys(SmallVec::new())
    }

    pub fn only(modifiers: &[Modifier]) -> Self {
        AllowedKeys::Keys(modifiers.iter().copied().collect())
    }

    /// Parse the optional template attribute; absent means `Unset`.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, ActionError> {
        match raw {
            None => Ok(AllowedKeys::Unset),
            Some(raw) => raw.parse(),
        }
    }

    pub fn allows(&self, modifier: Modifier) -> bool {
        match self {
            AllowedKeys::Unset => false,
            AllowedKeys::Any => true,
            AllowedKeys::Keys(keys) => keys.contains(&modifier),
        }
    }
}

impl FromStr for AllowedKeys {
    type Err = ActionError;

    /// Accepts whitespace or comma separated names; `any` wins over the rest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());

        let mut keys: SmallVec<[Modifier; 4]> = SmallVec::new();
        let mut any = false;

        for token in tokens {
            if token.eq_ignore_ascii_case("any") {
                any = true;
                continue;
            }

            let modifier: Modifier = token.parse()?;
            if !keys.contains(&modifier) {
                keys.push(modifier);
            }
        }

        Ok(if any {
            AllowedKeys::Any
        } else {
            AllowedKeys::Keys(keys)
        })
    }
}

/// An input event as delivered by the element's listener.
///
/// `prevent_default` and `stop_propagation` only record intent; the host
/// event system reads the flags back after `handle` returns.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub event_type: CompactString,
    pub modifiers: ModifierState,
    pub button: Option<PointerButton>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl InputEvent {
    pub fn new(event_type: impl Into<CompactString>) -> Self {
        Self {
            event_type: event_type.into(),
            modifiers: ModifierState::default(),
            button: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// A primary-button click with no modifiers.
    pub fn click() -> Self {
        Self::new("click").with_button(PointerButton::Primary)
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.set(modifier, true);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: ModifierState) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = Some(button);
        self
    }

    /// Convert a terminal mouse event. Moves and drags map to `mousemove`,
    /// scrolling to `wheel`.
    pub fn from_mouse(event: &MouseEvent) -> Self {
        let (event_type, button) = match event.kind {
            MouseEventKind::Down(button) => ("mousedown", Some(PointerButton::from(button))),
            MouseEventKind::Up(button) => ("mouseup", Some(PointerButton::from(button))),
            MouseEventKind::Drag(button) => ("mousemove", Some(PointerButton::from(button))),
            MouseEventKind::Moved => ("mousemove", None),
            MouseEventKind::ScrollDown
            | MouseEventKind::ScrollUp
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight => ("wheel", None),
        };

        Self {
            button,
            ..Self::new(event_type).with_modifiers(event.modifiers.into())
        }
    }

    /// Convert a terminal key event into `keydown` / `keyup`.
    pub fn from_key(event: &KeyEvent) -> Self {
        let event_type = match event.kind {
            KeyEventKind::Release => "keyup",
            KeyEventKind::Press | KeyEventKind::Repeat => "keydown",
        };

        Self::new(event_type).with_modifiers(event.modifiers.into())
    }

    pub fn is_pressed(&self, modifier: Modifier) -> bool {
        self.modifiers.is_pressed(modifier)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.event_type)?;
        for modifier in Modifier::ALL {
            if self.is_pressed(modifier) {
                write!(f, "+{}", modifier.as_str())?;
            }
        }
        Ok(())
    }
}
