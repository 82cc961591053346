//! Static filter catalog and the category-driven filter picker.
//!
//! The catalog is a read-only table; the picker only decides which filter
//! buttons are visible and which one is highlighted.

use std::fmt;

/// Every filter the service knows, in display order.
static FILTERS: &[&str] = &[
    "ccd",
    "vintage",
    "kodachrome",
    "fuji_superia",
    "agfa",
    "retro_green",
    "dark_brown",
    "lomo",
    "dreamy",
    "vhs",
    "vaporwave",
    "glitch",
    "y2k",
    "cyberpunk",
    "neon_pop",
    "digital_cam",
    "cyber_pink",
    "retro_blue",
    "millennium_gold",
    "matrix_green",
    "disco_fever",
    "tech_silver",
    "y2k_purple",
    "misty_gray",
    "cloudy_dream",
    "foggy_memory",
    "silver_mist",
    "dusty_film",
    "hazy_night",
    "soft_focus",
    "vintage_blur",
    "neon_glow",
    "cyber_retro",
    "synthwave",
    "sepia_dust",
    "polaroid_fade",
    "chrome_shine",
    "bubble_pop",
    "glitch_art",
    "holographic",
    "electric_blue",
    "neon_pink",
    "cyber_green",
    "retro_orange",
    "film_grain",
    "aged_paper",
    "metallic_silver",
    "neon_cyan",
    "digital_noise",
    "rainbow_shift",
];

static BASIC: &[&str] = &[
    "ccd",
    "vintage",
    "lomo",
    "dreamy",
    "neon_glow",
    "cyber_retro",
    "synthwave",
    "electric_blue",
    "neon_pink",
    "cyber_green",
    "retro_orange",
];

static VINTAGE: &[&str] = &[
    "kodachrome",
    "fuji_superia",
    "agfa",
    "retro_green",
    "dark_brown",
    "vhs",
    "sepia_dust",
    "polaroid_fade",
    "film_grain",
    "aged_paper",
];

static Y2K: &[&str] = &[
    "y2k",
    "cyberpunk",
    "neon_pop",
    "cyber_pink",
    "y2k_purple",
    "millennium_gold",
    "chrome_shine",
    "bubble_pop",
    "metallic_silver",
    "neon_cyan",
];

static EFFECTS: &[&str] = &[
    "vaporwave",
    "glitch",
    "matrix_green",
    "disco_fever",
    "tech_silver",
    "glitch_art",
    "holographic",
    "digital_noise",
    "rainbow_shift",
];

static ADVANCED: &[&str] = &[
    "digital_cam",
    "retro_blue",
    "misty_gray",
    "cloudy_dream",
    "foggy_memory",
    "silver_mist",
    "dusty_film",
    "hazy_night",
    "soft_focus",
    "vintage_blur",
];

/// Filter the service falls back to when none was chosen.
pub const DEFAULT_FILTER: FilterId = FilterId("ccd");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Identifier of a filter listed in the catalog.
pub struct FilterId(&'static str);

impl FilterId {
    /// Looks up a filter by its service name.
    pub fn find(name: &str) -> Option<Self> {
        let name = name.trim();
        FILTERS.iter().copied().find(|f| *f == name).map(FilterId)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }

    /// Human readable button label, e.g. `fuji_superia` -> `Fuji Superia`.
    pub fn label(self) -> String {
        humanize(self.0)
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn humanize(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| match w {
            "ccd" | "vhs" | "y2k" => w.to_ascii_uppercase(),
            _ => {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    All,
    Basic,
    Vintage,
    Y2k,
    Effects,
    Advanced,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::All,
        Category::Basic,
        Category::Vintage,
        Category::Y2k,
        Category::Effects,
        Category::Advanced,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Basic => "basic",
            Category::Vintage => "vintage",
            Category::Y2k => "y2k",
            Category::Effects => "effects",
            Category::Advanced => "advanced",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Basic => "Basic",
            Category::Vintage => "Vintage",
            Category::Y2k => "Y2K",
            Category::Effects => "Effects",
            Category::Advanced => "Advanced",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key))
    }

    fn members(self) -> &'static [&'static str] {
        match self {
            Category::All => FILTERS,
            Category::Basic => BASIC,
            Category::Vintage => VINTAGE,
            Category::Y2k => Y2K,
            Category::Effects => EFFECTS,
            Category::Advanced => ADVANCED,
        }
    }

    /// Filters in this category, in catalog order.
    pub fn filters(self) -> impl Iterator<Item = FilterId> {
        self.members().iter().copied().map(FilterId)
    }

    pub fn contains(self, id: FilterId) -> bool {
        self == Category::All || self.members().contains(&id.0)
    }
}

/// Every filter in the catalog.
pub fn all_filters() -> impl Iterator<Item = FilterId> {
    Category::All.filters()
}

#[derive(Debug, Default)]
/// Visibility and highlight state of the filter buttons.
///
/// The picker never triggers processing: switching categories only changes
/// what is shown.
pub struct FilterPicker {
    category: Category,
    selected: Option<FilterId>,
}

impl FilterPicker {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            selected: None,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn selected(&self) -> Option<FilterId> {
        self.selected
    }

    pub fn is_visible(&self, id: FilterId) -> bool {
        self.category.contains(id)
    }

    /// Filters whose buttons are shown for the active category.
    pub fn visible(&self) -> impl Iterator<Item = FilterId> + '_ {
        all_filters().filter(|id| self.is_visible(*id))
    }

    /// Switches category. Returns the filter whose highlight was dropped
    /// because its button became hidden.
    pub fn set_category(&mut self, category: Category) -> Option<FilterId> {
        self.category = category;
        match self.selected {
            Some(id) if !self.is_visible(id) => {
                self.selected = None;
                tracing::debug!(filter = %id, category = category.key(), "selection hidden");
                Some(id)
            }
            _ => None,
        }
    }

    pub fn select(&mut self, id: FilterId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn id(name: &str) -> FilterId {
        FilterId::find(name).unwrap()
    }

    #[test]
    fn catalog_has_fifty_unique_filters() {
        let names: HashSet<_> = all_filters().map(FilterId::as_str).collect();
        assert_eq!(names.len(), 50);
        assert_eq!(FILTERS.len(), 50);
    }

    #[test]
    fn every_category_member_is_in_the_catalog() {
        for category in Category::ALL {
            for name in category.members() {
                assert!(FilterId::find(name).is_some(), "{} not in catalog", name);
            }
        }
    }

    #[test]
    fn every_filter_belongs_to_exactly_one_named_category() {
        for filter in all_filters() {
            let owners = Category::ALL[1..]
                .iter()
                .filter(|c| c.contains(filter))
                .count();
            assert_eq!(owners, 1, "{}", filter);
        }
    }

    #[test]
    fn find_rejects_unknown_names() {
        assert_eq!(FilterId::find("sharpen"), None);
        assert_eq!(FilterId::find(" vintage "), Some(id("vintage")));
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(id("fuji_superia").label(), "Fuji Superia");
        assert_eq!(id("ccd").label(), "CCD");
        assert_eq!(id("y2k_purple").label(), "Y2K Purple");
    }

    #[test]
    fn category_keys_round_trip_through_parse() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.key()), Some(category));
        }
        assert_eq!(Category::parse("Y2K"), Some(Category::Y2k));
        assert_eq!(Category::parse("portrait"), None);
    }

    #[test]
    fn all_category_shows_every_button() {
        let picker = FilterPicker::new(Category::All);
        assert_eq!(picker.visible().count(), 50);
    }

    #[test]
    fn category_limits_visible_buttons_in_catalog_order() {
        let picker = FilterPicker::new(Category::Effects);
        let shown: Vec<_> = picker.visible().map(FilterId::as_str).collect();
        assert_eq!(
            shown,
            vec![
                "vaporwave",
                "glitch",
                "matrix_green",
                "disco_fever",
                "tech_silver",
                "glitch_art",
                "holographic",
                "digital_noise",
                "rainbow_shift",
            ]
        );
    }

    #[test]
    fn hiding_the_selected_filter_clears_it_without_picking_another() {
        let mut picker = FilterPicker::default();
        picker.select(id("vhs"));

        assert_eq!(picker.set_category(Category::Basic), Some(id("vhs")));
        assert_eq!(picker.selected(), None);

        // Switching back does not restore or invent a selection.
        assert_eq!(picker.set_category(Category::Vintage), None);
        assert_eq!(picker.selected(), None);
    }

    #[test]
    fn visible_selection_survives_category_switch() {
        let mut picker = FilterPicker::default();
        picker.select(id("lomo"));
        assert_eq!(picker.set_category(Category::Basic), None);
        assert_eq!(picker.selected(), Some(id("lomo")));
        assert_eq!(picker.set_category(Category::All), None);
        assert_eq!(picker.selected(), Some(id("lomo")));
    }
}
