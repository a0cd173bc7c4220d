/// Query-string filter parsing
///
/// Recipe listing accepts `?tags=1,2&ingredients=3`. This module turns those
/// comma-separated values into id lists for
/// [`RecipeFilter`](crate::models::recipe::RecipeFilter).

use crate::models::recipe::RecipeFilter;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// A segment is not an integer id
    #[error("\"{0}\" is not a valid id")]
    InvalidId(String),
}

/// Parses a comma-separated id list
///
/// Whitespace around segments and empty segments are ignored.
///
/// ```
/// use recipebox_shared::filters::parse_id_list;
///
/// assert_eq!(parse_id_list("1, 2,,3").unwrap(), vec![1, 2, 3]);
/// assert!(parse_id_list("").unwrap().is_empty());
/// assert!(parse_id_list("1,abc").is_err());
/// ```
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, FilterError> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .parse::<i64>()
                .map_err(|_| FilterError::InvalidId(segment.to_string()))
        })
        .collect()
}

/// Builds a recipe filter from the raw `tags` / `ingredients` parameters
///
/// A parameter that is absent or lists no ids leaves that half of the
/// filter off.
pub fn recipe_filter(
    tags: Option<&str>,
    ingredients: Option<&str>,
) -> Result<RecipeFilter, FilterError> {
    fn ids(raw: Option<&str>) -> Result<Option<Vec<i64>>, FilterError> {
        match raw {
            Some(raw) => parse_id_list(raw).map(|ids| Some(ids).filter(|ids| !ids.is_empty())),
            None => Ok(None),
        }
    }

    Ok(RecipeFilter {
        tag_ids: ids(tags)?,
        ingredient_ids: ids(ingredients)?,
    })
}
