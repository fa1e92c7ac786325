//! Dependency Orderer: topological sort over composite types (by
//! attribute dependency) or FK constraints (by referenced table), ties
//! broken by schema then name for deterministic output.

use crate::error::{DependencyError, Result};
use crate::model::composite::CompositeType;
use crate::model::ident::QualifiedName;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::BTreeMap;

/// Orders composite types so each item's `UserDefined` attribute
/// dependencies precede it.
pub fn order_composite_types(types: &[CompositeType]) -> Result<Vec<QualifiedName>> {
    let mut sorted: Vec<&CompositeType> = types.iter().collect();
    sorted.sort_by(|a, b| sort_key(&a.name).cmp(&sort_key(&b.name)));

    let mut graph: DiGraph<&QualifiedName, ()> = DiGraph::new();
    let mut index_of: BTreeMap<(String, String), _> = BTreeMap::new();

    for ty in &sorted {
        let idx = graph.add_node(&ty.name);
        index_of.insert(sort_key(&ty.name), idx);
    }

    for ty in &sorted {
        let Some(&to) = index_of.get(&sort_key(&ty.name)) else {
            continue;
        };
        for dep in ty.dependencies() {
            if let Some(&from) = index_of.get(&sort_key(dep)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| {
        let members = collect_cycle_members(&graph, cycle.node_id());
        DependencyError::Cycle { members }
    })?;

    Ok(order.into_iter().map(|idx| graph[idx].clone()).collect())
}

fn sort_key(name: &QualifiedName) -> (String, String) {
    (
        name.schema.oracle_form(),
        name.name.to_uppercase(),
    )
}

/// The cycle detector only hands back one node on the cycle; walk its
/// outgoing edges to recover the rest for the error message.
fn collect_cycle_members(
    graph: &DiGraph<&QualifiedName, ()>,
    start: petgraph::graph::NodeIndex,
) -> Vec<QualifiedName> {
    use petgraph::Direction;
    let mut members = vec![graph[start].clone()];
    for neighbor in graph.neighbors_directed(start, Direction::Outgoing) {
        if neighbor != start {
            members.push(graph[neighbor].clone());
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::composite::Attribute;
    use crate::model::types::TypeRef;

    fn composite(schema: &str, name: &str, deps: &[(&str, &str)]) -> CompositeType {
        CompositeType {
            name: QualifiedName::new(schema, name),
            attributes: deps
                .iter()
                .map(|(s, n)| Attribute {
                    name: "attr".into(),
                    type_ref: TypeRef::UserDefined(QualifiedName::new(*s, *n)),
                })
                .collect(),
        }
    }

    #[test]
    fn independent_types_sort_by_schema_then_name() {
        let types = vec![
            composite("HR", "ZEBRA_T", &[]),
            composite("HR", "ADDRESS_T", &[]),
        ];
        let order = order_composite_types(&types).unwrap();
        assert_eq!(order[0].name, "ADDRESS_T");
        assert_eq!(order[1].name, "ZEBRA_T");
    }

    #[test]
    fn dependency_precedes_dependent() {
        let types = vec![
            composite("HR", "PERSON_T", &[("HR", "ADDRESS_T")]),
            composite("HR", "ADDRESS_T", &[]),
        ];
        let order = order_composite_types(&types).unwrap();
        let address_pos = order.iter().position(|q| q.name == "ADDRESS_T").unwrap();
        let person_pos = order.iter().position(|q| q.name == "PERSON_T").unwrap();
        assert!(address_pos < person_pos);
    }

    #[test]
    fn a_cycle_is_reported() {
        let types = vec![
            composite("HR", "A_T", &[("HR", "B_T")]),
            composite("HR", "B_T", &[("HR", "A_T")]),
        ];
        assert!(order_composite_types(&types).is_err());
    }
}
