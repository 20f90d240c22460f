//! Resolver: checks attribute references in a parsed policy
//!
//! Runs after parsing and before the policy is handed out. Catches
//! policies that are syntactically valid but refer to attributes that
//! do not exist, declare a name twice, or define attributes in terms of
//! themselves.

use crate::errors::{CompileError, CompileResult};
use crate::parser::ParsedPolicy;
use std::collections::{HashMap, HashSet};

/// Resolve every attribute reference in a parsed policy
pub fn resolve(policy: &ParsedPolicy) -> CompileResult<()> {
    validate_unique_attributes(policy)?;
    validate_references(policy)?;
    validate_acyclic(policy)?;
    Ok(())
}

fn validate_unique_attributes(policy: &ParsedPolicy) -> CompileResult<()> {
    let mut seen = HashSet::new();
    for attribute in &policy.attributes {
        if !seen.insert(attribute.name.as_str()) {
            return Err(CompileError::DuplicateAttribute(attribute.name.clone()));
        }
    }
    Ok(())
}

fn validate_references(policy: &ParsedPolicy) -> CompileResult<()> {
    let declared: HashSet<&str> = policy.attributes.iter().map(|a| a.name.as_str()).collect();

    let mut unknown = None;
    let mut check = |name: &str| {
        if unknown.is_none() && !declared.contains(name) {
            unknown = Some(name.to_string());
        }
    };

    for attribute in &policy.attributes {
        attribute.value.visit_attributes(&mut check);
    }
    for rule in &policy.rules {
        rule.visit_attributes(&mut check);
    }

    match unknown {
        Some(name) => Err(CompileError::UnknownAttribute(name)),
        None => Ok(()),
    }
}

fn validate_acyclic(policy: &ParsedPolicy) -> CompileResult<()> {
    let mut deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for attribute in &policy.attributes {
        let mut refs = Vec::new();
        attribute.value.visit_attributes(&mut |name| refs.push(name));
        deps.insert(attribute.name.as_str(), refs);
    }

    let mut done = HashSet::new();
    for attribute in &policy.attributes {
        walk(attribute.name.as_str(), &deps, &mut done)?;
    }
    Ok(())
}

/// Depth-first walk from `root` with an explicit stack, so long reference
/// chains cannot exhaust the call stack
fn walk<'a>(
    root: &'a str,
    deps: &HashMap<&'a str, Vec<&'a str>>,
    done: &mut HashSet<&'a str>,
) -> CompileResult<()> {
    if done.contains(root) {
        return Ok(());
    }

    // (attribute, index of the next dependency to visit)
    let mut path: Vec<(&str, usize)> = vec![(root, 0)];
    let mut on_path: HashSet<&str> = HashSet::from([root]);

    while let Some(&(name, next)) = path.last() {
        let children = deps.get(name).map_or(&[][..], Vec::as_slice);
        let Some(&dep) = children.get(next) else {
            path.pop();
            on_path.remove(name);
            done.insert(name);
            continue;
        };

        if let Some(top) = path.last_mut() {
            top.1 += 1;
        }
        if done.contains(dep) {
            continue;
        }
        if on_path.contains(dep) {
            let start = path.iter().position(|(n, _)| *n == dep).unwrap_or(0);
            let mut cycle: Vec<&str> = path[start..].iter().map(|(n, _)| *n).collect();
            cycle.push(dep);
            return Err(CompileError::CyclicAttribute(cycle.join(" -> ")));
        }

        on_path.insert(dep);
        path.push((dep, 0));
    }
    Ok(())
}
