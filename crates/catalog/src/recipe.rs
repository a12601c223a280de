//! Recipe definitions and grid matching.
//!
//! Grids are row-major slices of 4 (2x2) or 9 (3x3) optional items. All
//! matchers are total: any structural mismatch is a plain `false`, never an
//! error.

use crate::definition::IngredientSpec;
use std::collections::BTreeMap;
use trinketforge_core::{IdentityResolver, ItemSnapshot};

/// Side length for a supported grid slice length (4 or 9).
pub fn grid_side(len: usize) -> Option<usize> {
    match len {
        4 => Some(2),
        9 => Some(3),
        _ => None,
    }
}

/// Occupied bounding box of the grid's non-empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min_row: usize,
    min_col: usize,
    width: usize,
    height: usize,
}

fn occupied_bounds(grid: &[Option<ItemSnapshot>], side: usize) -> Option<Bounds> {
    let mut min_row = side;
    let mut max_row = None;
    let mut min_col = side;
    let mut max_col = None;
    for row in 0..side {
        for col in 0..side {
            if grid[row * side + col].is_some() {
                min_row = min_row.min(row);
                min_col = min_col.min(col);
                max_row = Some(max_row.map_or(row, |m: usize| m.max(row)));
                max_col = Some(max_col.map_or(col, |m: usize| m.max(col)));
            }
        }
    }
    let (max_row, max_col) = (max_row?, max_col?);
    Some(Bounds {
        min_row,
        min_col,
        width: max_col - min_col + 1,
        height: max_row - min_row + 1,
    })
}

/// A recipe whose ingredients must occupy a specific relative arrangement.
///
/// The pattern is normalized at construction: rows of space/key characters
/// are cropped to their non-space bounding box, and matching compares that
/// box against the grid's own occupied box under a single fixed alignment.
/// Recipes are directional by design; no rotation or reflection is tried.
#[derive(Debug, Clone)]
pub struct ShapedRecipe {
    /// Recipe id, unique within the definition.
    pub id: String,
    /// Definition produced by this recipe.
    pub output_id: String,
    /// Items produced per craft.
    pub amount: u32,
    /// Raw pattern rows as declared (space = empty).
    pub pattern: Vec<String>,
    /// Pattern character to ingredient mapping.
    pub key: BTreeMap<char, IngredientSpec>,
    pattern_min_row: usize,
    pattern_min_col: usize,
    effective_width: usize,
    effective_height: usize,
}

impl ShapedRecipe {
    /// Build a shaped recipe, deriving the pattern's non-space bounding box.
    pub fn new(
        id: impl Into<String>,
        output_id: impl Into<String>,
        amount: u32,
        pattern: Vec<String>,
        key: BTreeMap<char, IngredientSpec>,
    ) -> Self {
        let mut min_row = pattern.len();
        let mut max_row = None;
        let mut min_col = usize::MAX;
        let mut max_col = None;
        for (row, line) in pattern.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    min_row = min_row.min(row);
                    min_col = min_col.min(col);
                    max_row = Some(max_row.map_or(row, |m: usize| m.max(row)));
                    max_col = Some(max_col.map_or(col, |m: usize| m.max(col)));
                }
            }
        }
        let (effective_width, effective_height, pattern_min_row, pattern_min_col) =
            match (max_row, max_col) {
                (Some(max_row), Some(max_col)) => (
                    max_col - min_col + 1,
                    max_row - min_row + 1,
                    min_row,
                    min_col,
                ),
                _ => (0, 0, 0, 0),
            };
        Self {
            id: id.into(),
            output_id: output_id.into(),
            amount: amount.max(1),
            pattern,
            key,
            pattern_min_row,
            pattern_min_col,
            effective_width,
            effective_height,
        }
    }

    /// Width of the cropped pattern box (0 for an all-space pattern).
    pub fn effective_width(&self) -> usize {
        self.effective_width
    }

    /// Height of the cropped pattern box (0 for an all-space pattern).
    pub fn effective_height(&self) -> usize {
        self.effective_height
    }

    /// Pattern character at the given offset inside the cropped box.
    fn pattern_char(&self, p_row: usize, p_col: usize) -> char {
        self.pattern
            .get(self.pattern_min_row + p_row)
            .and_then(|line| line.chars().nth(self.pattern_min_col + p_col))
            .unwrap_or(' ')
    }

    /// Test the grid against this recipe under the single bounding-box
    /// alignment.
    pub fn matches(&self, grid: &[Option<ItemSnapshot>], resolver: &dyn IdentityResolver) -> bool {
        let Some(side) = grid_side(grid.len()) else {
            return false;
        };
        let Some(bounds) = occupied_bounds(grid, side) else {
            // An empty grid matches only an empty pattern.
            return self.effective_width == 0;
        };
        if self.effective_width == 0 {
            return false;
        }
        if bounds.width != self.effective_width || bounds.height != self.effective_height {
            return false;
        }

        for p_row in 0..self.effective_height {
            for p_col in 0..self.effective_width {
                let ch = self.pattern_char(p_row, p_col);
                let grid_row = bounds.min_row + p_row;
                let grid_col = bounds.min_col + p_col;
                let cell = grid[grid_row * side + grid_col].as_ref();

                if ch == ' ' {
                    if cell.is_some() {
                        return false;
                    }
                    continue;
                }
                let Some(spec) = self.key.get(&ch) else {
                    return false;
                };
                if !spec.matches_item(cell, resolver) {
                    return false;
                }
            }
        }
        true
    }

    /// The grid's bounding-box origin when its dimensions agree with the
    /// pattern box, independent of per-cell ingredient checks. Used by
    /// callers that need to know where the ingredients physically sit.
    pub fn find_offset(&self, grid: &[Option<ItemSnapshot>]) -> Option<(usize, usize)> {
        let side = grid_side(grid.len())?;
        let bounds = occupied_bounds(grid, side)?;
        if bounds.width != self.effective_width || bounds.height != self.effective_height {
            return None;
        }
        Some((bounds.min_row, bounds.min_col))
    }
}

/// A recipe whose ingredients may occupy any grid positions, unordered.
#[derive(Debug, Clone)]
pub struct ShapelessRecipe {
    /// Recipe id, unique within the definition.
    pub id: String,
    /// Definition produced by this recipe.
    pub output_id: String,
    /// Items produced per craft.
    pub amount: u32,
    /// Required ingredients; duplicates each claim a distinct cell.
    pub ingredients: Vec<IngredientSpec>,
}

impl ShapelessRecipe {
    /// Build a shapeless recipe.
    pub fn new(
        id: impl Into<String>,
        output_id: impl Into<String>,
        amount: u32,
        ingredients: Vec<IngredientSpec>,
    ) -> Self {
        Self {
            id: id.into(),
            output_id: output_id.into(),
            amount: amount.max(1),
            ingredients,
        }
    }

    /// Test the grid's non-empty cells against the ingredient multiset.
    ///
    /// Assignment is greedy first-fit: each ingredient, in declared order,
    /// claims the first unclaimed cell (in index order) that satisfies it.
    /// This is intentionally not maximum bipartite matching; upgrading it
    /// would change which recipes match ambiguous grids.
    pub fn matches(&self, grid: &[Option<ItemSnapshot>], resolver: &dyn IdentityResolver) -> bool {
        if grid_side(grid.len()).is_none() {
            return false;
        }

        let items: Vec<&ItemSnapshot> = grid.iter().filter_map(|cell| cell.as_ref()).collect();
        if items.len() != self.ingredients.len() {
            return false;
        }

        let mut claimed = vec![false; items.len()];
        for spec in &self.ingredients {
            let mut found = false;
            for (idx, item) in items.iter().enumerate() {
                if claimed[idx] {
                    continue;
                }
                if spec.matches_item(Some(item), resolver) {
                    claimed[idx] = true;
                    found = true;
                    break;
                }
            }
            if !found {
                return false;
            }
        }
        true
    }
}

/// A single-input (cutter-style) recipe: one ingredient, one output, with
/// the output chosen among candidates by an external selection layer.
#[derive(Debug, Clone)]
pub struct CutterRecipe {
    /// Recipe id, unique within the definition.
    pub id: String,
    /// Definition produced by this recipe.
    pub output_id: String,
    /// Items produced per cut.
    pub amount: u32,
    /// The single required input.
    pub input: IngredientSpec,
}

impl CutterRecipe {
    /// Build a cutter recipe.
    pub fn new(
        id: impl Into<String>,
        output_id: impl Into<String>,
        amount: u32,
        input: IngredientSpec,
    ) -> Self {
        Self {
            id: id.into(),
            output_id: output_id.into(),
            amount: amount.max(1),
            input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinketforge_core::Material;

    /// Resolver that trusts the embedded tag and nothing else.
    struct TagResolver;

    impl IdentityResolver for TagResolver {
        fn resolve<'a>(&'a self, item: &'a ItemSnapshot) -> Option<&'a str> {
            item.definition_tag.as_deref()
        }
    }

    fn stone() -> Option<ItemSnapshot> {
        Some(ItemSnapshot::of_material(
            Material::parse("stone").unwrap(),
            1,
        ))
    }

    fn coal() -> Option<ItemSnapshot> {
        Some(ItemSnapshot::of_material(
            Material::parse("coal").unwrap(),
            1,
        ))
    }

    fn tagged(id: &str) -> Option<ItemSnapshot> {
        let mut item = ItemSnapshot::of_material(Material::parse("player_head").unwrap(), 1);
        item.definition_tag = Some(id.to_string());
        Some(item)
    }

    fn stone_key() -> BTreeMap<char, IngredientSpec> {
        let mut key = BTreeMap::new();
        key.insert(
            '#',
            IngredientSpec::of_material(Material::parse("stone").unwrap()),
        );
        key
    }

    fn l_shape() -> ShapedRecipe {
        ShapedRecipe::new(
            "l",
            "out",
            1,
            vec!["##".to_string(), "# ".to_string()],
            stone_key(),
        )
    }

    #[test]
    fn test_pattern_bounding_box_is_cropped() {
        let recipe = ShapedRecipe::new(
            "padded",
            "out",
            1,
            vec!["   ".to_string(), " # ".to_string(), "   ".to_string()],
            stone_key(),
        );
        assert_eq!(recipe.effective_width(), 1);
        assert_eq!(recipe.effective_height(), 1);
    }

    #[test]
    fn test_empty_pattern_has_zero_width() {
        let recipe = ShapedRecipe::new("blank", "out", 1, vec!["  ".to_string()], stone_key());
        assert_eq!(recipe.effective_width(), 0);
        assert_eq!(recipe.effective_height(), 0);
    }

    #[test]
    fn test_l_shape_matches_2x2_grid() {
        // STONE at (0,0),(0,1),(1,0), empty (1,1).
        let grid = [stone(), stone(), stone(), None];
        assert!(l_shape().matches(&grid, &TagResolver));
    }

    #[test]
    fn test_l_shape_rejects_wrong_cell() {
        // STONE at (0,0),(0,1),(1,1) occupies the full 2x2 box but the
        // wrong cell is filled.
        let grid = [stone(), stone(), None, stone()];
        assert!(!l_shape().matches(&grid, &TagResolver));
    }

    #[test]
    fn test_l_shape_translated_in_3x3_grid() {
        // Same relative arrangement, bottom-right of a 3x3 grid.
        let mut grid: [Option<ItemSnapshot>; 9] = Default::default();
        grid[4] = stone(); // (1,1)
        grid[5] = stone(); // (1,2)
        grid[7] = stone(); // (2,1)
        assert!(l_shape().matches(&grid, &TagResolver));
        assert_eq!(l_shape().find_offset(&grid), Some((1, 1)));
    }

    #[test]
    fn test_rotation_does_not_match() {
        // 90-degree rotation of the L occupies the same 2x2 box with a
        // different filled cell; directional recipes must reject it.
        let grid = [stone(), stone(), None, stone()];
        assert!(!l_shape().matches(&grid, &TagResolver));
        // The offset is still reported: box dimensions agree.
        assert_eq!(l_shape().find_offset(&grid), Some((0, 0)));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        // A lone stone has a 1x1 box; the L needs 2x2.
        let grid = [stone(), None, None, None];
        assert!(!l_shape().matches(&grid, &TagResolver));
        assert_eq!(l_shape().find_offset(&grid), None);
    }

    #[test]
    fn test_empty_grid_matches_only_empty_pattern() {
        let empty: [Option<ItemSnapshot>; 4] = Default::default();
        assert!(!l_shape().matches(&empty, &TagResolver));

        let blank = ShapedRecipe::new("blank", "out", 1, vec!["  ".to_string()], stone_key());
        assert!(blank.matches(&empty, &TagResolver));

        // A non-empty grid never matches an empty pattern.
        let grid = [stone(), None, None, None];
        assert!(!blank.matches(&grid, &TagResolver));
    }

    #[test]
    fn test_invalid_grid_length_rejected() {
        let grid = [stone(), stone(), stone()];
        assert!(!l_shape().matches(&grid, &TagResolver));
        assert_eq!(l_shape().find_offset(&grid), None);
    }

    #[test]
    fn test_missing_key_entry_is_match_time_false() {
        let recipe = ShapedRecipe::new(
            "orphan",
            "out",
            1,
            vec!["?".to_string()],
            BTreeMap::new(),
        );
        let grid = [stone(), None, None, None];
        assert!(!recipe.matches(&grid, &TagResolver));
    }

    #[test]
    fn test_shaped_with_trinket_ingredient() {
        let mut key = BTreeMap::new();
        key.insert('P', IngredientSpec::of_trinket("oak_plank"));
        let recipe = ShapedRecipe::new("p", "out", 1, vec!["P".to_string()], key);

        let grid = [tagged("oak_plank"), None, None, None];
        assert!(recipe.matches(&grid, &TagResolver));

        let wrong = [tagged("birch_plank"), None, None, None];
        assert!(!recipe.matches(&wrong, &TagResolver));
    }

    fn plank_and_coal() -> ShapelessRecipe {
        ShapelessRecipe::new(
            "mix",
            "out",
            1,
            vec![
                IngredientSpec::of_trinket("oak_plank"),
                IngredientSpec::of_material(Material::parse("coal").unwrap()),
            ],
        )
    }

    #[test]
    fn test_shapeless_position_independent() {
        let recipe = plank_and_coal();
        // Any two of the nine slots.
        for (a, b) in [(0, 8), (3, 1), (7, 2)] {
            let mut grid: [Option<ItemSnapshot>; 9] = Default::default();
            grid[a] = tagged("oak_plank");
            grid[b] = coal();
            assert!(
                recipe.matches(&grid, &TagResolver),
                "slots {a} and {b} should match"
            );
        }
    }

    #[test]
    fn test_shapeless_count_mismatch_rejected() {
        let recipe = plank_and_coal();

        let mut too_few: [Option<ItemSnapshot>; 9] = Default::default();
        too_few[0] = tagged("oak_plank");
        assert!(!recipe.matches(&too_few, &TagResolver));

        let mut too_many: [Option<ItemSnapshot>; 9] = Default::default();
        too_many[0] = tagged("oak_plank");
        too_many[1] = coal();
        too_many[2] = coal();
        assert!(!recipe.matches(&too_many, &TagResolver));
    }

    #[test]
    fn test_shapeless_duplicates_claim_distinct_cells() {
        let coal_spec = IngredientSpec::of_material(Material::parse("coal").unwrap());
        let recipe = ShapelessRecipe::new("two_coal", "out", 1, vec![coal_spec.clone(), coal_spec]);

        let mut grid: [Option<ItemSnapshot>; 4] = Default::default();
        grid[0] = coal();
        grid[3] = coal();
        assert!(recipe.matches(&grid, &TagResolver));

        let mut one: [Option<ItemSnapshot>; 4] = Default::default();
        one[0] = coal();
        assert!(!recipe.matches(&one, &TagResolver));
    }

    #[test]
    fn test_shapeless_greedy_first_fit_is_preserved() {
        // A broad spec declared first claims the only cell the narrow spec
        // could use. Optimal bipartite matching would assign the broad spec
        // to the other cell and succeed; the greedy first-fit semantics must
        // keep failing.
        let broad = IngredientSpec::of_material(Material::parse("player_head").unwrap());
        let narrow = IngredientSpec::of_trinket("x");
        let recipe = ShapelessRecipe::new("greedy", "out", 1, vec![broad, narrow]);
        let mut grid: [Option<ItemSnapshot>; 4] = Default::default();
        grid[0] = tagged("x"); // broad claims this cell first
        grid[1] = tagged("y"); // narrow cannot use this one
        assert!(!recipe.matches(&grid, &TagResolver));

        // Declared order flipped, the same grid matches.
        let narrow = IngredientSpec::of_trinket("x");
        let broad = IngredientSpec::of_material(Material::parse("player_head").unwrap());
        let flipped = ShapelessRecipe::new("greedy_flipped", "out", 1, vec![narrow, broad]);
        let mut grid: [Option<ItemSnapshot>; 4] = Default::default();
        grid[0] = tagged("x");
        grid[1] = tagged("y");
        assert!(flipped.matches(&grid, &TagResolver));
    }
}
