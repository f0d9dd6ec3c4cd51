//! EventGate: modifier-key filtering for action events
//!
//! Without an explicit policy, pointer events only pass as simple clicks and
//! every other event class passes only with no modifier held.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::event::{AllowedKeys, InputEvent, Modifier, PointerButton};

static POINTER_EVENT_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^click|mouse|touch").expect("pointer event pattern is valid"));

pub struct EventGate;

impl EventGate {
    /// Pointer-like event classes (`click*`, anything mouse or touch).
    pub fn is_pointer_event(event_type: &str) -> bool {
        POINTER_EVENT_TYPE.is_match(event_type)
    }

    /// No modifier held and not a secondary or middle button.
    pub fn is_simple_click(event: &InputEvent) -> bool {
        let secondary_click = matches!(
            event.button,
            Some(PointerButton::Secondary | PointerButton::Auxiliary)
        );

        !event.modifiers.any() && !secondary_click
    }

    pub fn is_allowed(event: &InputEvent, allowed_keys: &AllowedKeys) -> bool {
        match allowed_keys {
            AllowedKeys::Unset if Self::is_pointer_event(&event.event_type) => {
                Self::is_simple_click(event)
            }
            AllowedKeys::Any => true,
            AllowedKeys::Unset | AllowedKeys::Keys(_) => Modifier::ALL
                .into_iter()
                .all(|modifier| !event.is_pressed(modifier) || allowed_keys.allows(modifier)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::ModifierState;

    fn every_modifier_combination() -> impl Iterator<Item = ModifierState> {
        (0u8..16).map(|bits| ModifierState {
            alt: bits & 1 != 0,
            shift: bits & 2 != 0,
            meta: bits & 4 != 0,
            ctrl: bits & 8 != 0,
        })
    }

    #[test]
    fn test_any_allows_every_combination() {
        for event_type in ["click", "keydown", "touchstart"] {
            for modifiers in every_modifier_combination() {
                let event = InputEvent::new(event_type).with_modifiers(modifiers);
                assert!(EventGate::is_allowed(&event, &AllowedKeys::Any), "{event}");
            }
        }
    }

    #[test]
    fn test_unset_pointer_requires_simple_click() {
        assert!(EventGate::is_allowed(&InputEvent::click(), &AllowedKeys::Unset));

        for modifier in Modifier::ALL {
            let event = InputEvent::click().with_modifier(modifier);
            assert!(!EventGate::is_allowed(&event, &AllowedKeys::Unset), "{event}");
        }

        let right_click = InputEvent::new("mouseup").with_button(PointerButton::Secondary);
        assert!(!EventGate::is_allowed(&right_click, &AllowedKeys::Unset));
    }

    #[test]
    fn test_unset_non_pointer_rejects_modifiers() {
        let plain = InputEvent::new("keydown");
        assert!(EventGate::is_allowed(&plain, &AllowedKeys::Unset));

        let shifted = InputEvent::new("keydown").with_modifier(Modifier::Shift);
        assert!(!EventGate::is_allowed(&shifted, &AllowedKeys::Unset));
    }

    #[test]
    fn test_explicit_keys_whitelist() {
        let allowed = AllowedKeys::only(&[Modifier::Alt]);

        let alt_click = InputEvent::click().with_modifier(Modifier::Alt);
        assert!(EventGate::is_allowed(&alt_click, &allowed));

        let alt_shift = alt_click.clone().with_modifier(Modifier::Shift);
        assert!(!EventGate::is_allowed(&alt_shift, &allowed));

        // An explicit set bypasses the simple-click rule for secondary buttons.
        let right_click = InputEvent::new("click").with_button(PointerButton::Secondary);
        assert!(EventGate::is_allowed(&right_click, &allowed));
    }

    #[test]
    fn test_pointer_classification() {
        assert!(EventGate::is_pointer_event("click"));
        assert!(EventGate::is_pointer_event("mousedown"));
        assert!(EventGate::is_pointer_event("touchend"));
        assert!(!EventGate::is_pointer_event("keyup"));
        assert!(!EventGate::is_pointer_event("submit"));
    }
}
