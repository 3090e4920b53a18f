use serde::{ser::SerializeStruct, Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::{
    document::{DocumentSource, ResolvedType, Variable, VariableCollection},
    resolve::Resolver,
};

/// One variable's value in one mode, resolved to its output string.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub name: String,
    pub value: String,
    pub collection: String,
    pub mode: String,
    pub resolved_type: ResolvedType,
    pub original_value: serde_json::Value,
}

impl Token {
    /// Type label used for grouping and counting.
    pub fn type_name(&self) -> &'static str {
        self.resolved_type.as_str()
    }
}

// `type` mirrors `resolvedType` so payload consumers can group on either key.
impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Token", 7)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("type", self.type_name())?;
        s.serialize_field("collection", &self.collection)?;
        s.serialize_field("mode", &self.mode)?;
        s.serialize_field("resolvedType", &self.resolved_type)?;
        s.serialize_field("originalValue", &self.original_value)?;
        s.end()
    }
}

const PROGRESS_EVERY: usize = 50;

/// Number of (variable, mode) pairs a complete collection pass would produce.
pub fn expected_token_count(variables: &[Variable], collections: &[VariableCollection]) -> usize {
    collections
        .iter()
        .filter_map(|c| c.modes.as_ref().map(|modes| (c, modes.len())))
        .map(|(c, modes)| variables_in(variables, c).count() * modes)
        .sum()
}

fn variables_in<'v>(
    variables: &'v [Variable],
    collection: &'v VariableCollection,
) -> impl Iterator<Item = &'v Variable> + 'v {
    variables
        .iter()
        .filter(move |v| v.variable_collection_id == collection.id)
}

/// Resolve every defined (variable, mode) pair into a token.
///
/// Iteration is collection → mode → variable, each in the given order.
/// Malformed collections, modes and variables are skipped with a warning.
pub async fn collect_tokens(
    source: &dyn DocumentSource,
    variables: &[Variable],
    collections: &[VariableCollection],
) -> Vec<Token> {
    if variables.is_empty() {
        warn!("no variables provided for token collection");
        return Vec::new();
    }
    if collections.is_empty() {
        warn!("no collections provided for token collection");
        return Vec::new();
    }

    let expected = expected_token_count(variables, collections);
    debug!(expected, "collecting variable-mode combinations");

    let resolver = Resolver::new(source);
    let mut tokens = Vec::new();

    for collection in collections {
        let (Some(collection_name), Some(modes)) = (non_empty(&collection.name), collection.modes.as_ref())
        else {
            warn!(
                collection = collection.name.as_deref().unwrap_or("unknown"),
                "skipping invalid collection"
            );
            continue;
        };

        debug!(collection = collection_name, "processing collection");
        let members: Vec<&Variable> = variables_in(variables, collection).collect();

        for mode in modes {
            let (Some(mode_name), Some(mode_id)) = (non_empty(&mode.name), non_empty(&mode.mode_id)) else {
                warn!(collection = collection_name, "skipping invalid mode");
                continue;
            };

            for variable in &members {
                let (Some(name), Some(values)) = (non_empty(&variable.name), variable.values_by_mode.as_ref())
                else {
                    warn!(
                        collection = collection_name,
                        id = %variable.id,
                        "skipping invalid variable"
                    );
                    continue;
                };

                let Some(raw) = values.get(mode_id) else {
                    continue;
                };

                let value = resolver.resolve(Some(raw), variable.resolved_type).await;
                tokens.push(Token {
                    name: name.to_string(),
                    value,
                    collection: collection_name.to_string(),
                    mode: mode_name.to_string(),
                    resolved_type: variable.resolved_type,
                    original_value: raw.clone(),
                });

                if tokens.len() % PROGRESS_EVERY == 0 || tokens.len() == expected {
                    debug!("progress: {}/{} tokens processed", tokens.len(), expected);
                }
            }
        }
    }

    info!(collected = tokens.len(), expected, "token collection complete");
    tokens
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}
