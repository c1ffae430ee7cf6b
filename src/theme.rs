//! Accent color resolution per visual role.

use crate::style::{Color, ResolvedStyle, ThemeRole};
use std::collections::BTreeSet;

/// The accent color together with the roles it is enabled for.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    accent: Color,
    roles: BTreeSet<ThemeRole>,
    text: Color,
    muted: Color,
}

impl ThemeColors {
    pub fn new(style: &ResolvedStyle) -> Self {
        Self {
            accent: style.theme.accent_color,
            roles: style.theme.accent_roles.clone(),
            text: style.typography.text_color,
            muted: style.typography.muted_color,
        }
    }

    /// Whether the accent applies to `role`.
    pub fn applies(&self, role: ThemeRole) -> bool {
        self.roles.contains(&role)
    }

    /// The accent if it applies to `role`, otherwise `fallback`.
    pub fn color_for(&self, role: ThemeRole, fallback: Color) -> Color {
        if self.applies(role) {
            self.accent
        } else {
            fallback
        }
    }

    pub fn accent(&self) -> Color {
        self.accent
    }

    /// Body text color.
    pub fn text(&self) -> Color {
        self.text
    }

    /// Secondary text color (dates, locations, contact line).
    pub fn muted(&self) -> Color {
        self.muted
    }

    /// Resolved color of each role, with body text as the fallback.
    pub fn palette(&self) -> Vec<(ThemeRole, Color)> {
        ThemeRole::ALL
            .iter()
            .map(|&role| (role, self.color_for(role, self.text)))
            .collect()
    }
}
