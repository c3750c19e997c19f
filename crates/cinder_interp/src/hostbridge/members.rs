use rustc_hash::FxHashMap;

use super::{HostClass, HostClassId, HostRegistry};

/// Points at a field or method in a specific class's descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef {
    pub class: HostClassId,
    pub index: usize,
}

/// A JavaBean-style property collapsed from `getX`/`isX` (+ `setX`).
#[derive(Debug, Clone)]
pub struct BeanProperty {
    pub getter: MemberRef,
    pub setters: Vec<MemberRef>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(MemberRef),
    /// All same-named overloads, across the class hierarchy.
    Methods(Vec<MemberRef>),
    Bean(BeanProperty),
}

/// The synthesized member tables of a host class: script-visible name to
/// member, separately for instance and static members, preserving
/// declaration order for enumeration.
#[derive(Debug, Default)]
pub struct Members {
    instance: FxHashMap<String, Member>,
    statics: FxHashMap<String, Member>,
    instance_order: Vec<String>,
    statics_order: Vec<String>,
}

impl Members {
    pub fn instance(&self, name: &str) -> Option<&Member> {
        self.instance.get(name)
    }

    pub fn statics(&self, name: &str) -> Option<&Member> {
        self.statics.get(name)
    }

    pub fn instance_names(&self) -> &[String] {
        &self.instance_order
    }

    pub fn static_names(&self) -> &[String] {
        &self.statics_order
    }

    fn insert(&mut self, is_static: bool, name: String, member: Member) {
        let (map, order) = if is_static {
            (&mut self.statics, &mut self.statics_order)
        } else {
            (&mut self.instance, &mut self.instance_order)
        };
        if !map.contains_key(&name) {
            order.push(name.clone());
        }
        map.insert(name, member);
    }

    fn merge_method(&mut self, is_static: bool, name: String, method: MemberRef) {
        let map = if is_static { &mut self.statics } else { &mut self.instance };
        if let Some(Member::Methods(overloads)) = map.get_mut(&name) {
            overloads.push(method);
            return;
        }
        self.insert(is_static, name, Member::Methods(vec![method]));
    }
}

/// The script-visible name of a member: the embedder's remap hook first,
/// then prefix stripping.
fn effective_name(class: &HostClass, raw: &str) -> String {
    if let Some(remap) = &class.remap {
        if let Some(renamed) = remap(raw) {
            return renamed;
        }
    }
    for prefix in &class.prefixes {
        if let Some(stripped) = raw.strip_prefix(prefix.as_str()) {
            if !stripped.is_empty() {
                return lower_first(stripped);
            }
        }
    }
    raw.to_owned()
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Recognizes a JavaBean accessor name: `getX`/`isX` → `x`.
fn bean_property_name(name: &str) -> Option<String> {
    let stripped = name
        .strip_prefix("get")
        .or_else(|| name.strip_prefix("is"))?;
    if stripped.is_empty() || !stripped.chars().next().unwrap().is_uppercase() {
        return None;
    }
    Some(lower_first(stripped))
}

fn bean_setter_name(name: &str) -> Option<String> {
    let stripped = name.strip_prefix("set")?;
    if stripped.is_empty() || !stripped.chars().next().unwrap().is_uppercase() {
        return None;
    }
    Some(lower_first(stripped))
}

/// Builds the member tables for a class: supertype members first so the
/// class's own declarations shadow or extend them.
pub fn build(registry: &HostRegistry, id: HostClassId) -> Members {
    let mut members = Members::default();
    collect(registry, id, &mut members);

    // Bean pass: collapse accessor pairs into properties, without clobbering
    // explicit members of the same name. Walking the declaration-order name
    // lists keeps the result deterministic; when both `getX` and `isX`
    // exist, `getX` supplies the getter.
    let mut beans: Vec<(bool, String, bool, BeanProperty)> = Vec::new();
    for (is_static, map, order) in [
        (false, &members.instance, &members.instance_order),
        (true, &members.statics, &members.statics_order),
    ] {
        for name in order {
            let Some(Member::Methods(overloads)) = map.get(name) else {
                continue;
            };
            let Some(property) = bean_property_name(name) else { continue };
            if map.contains_key(&property) {
                continue;
            }

            let Some(&getter) = overloads
                .iter()
                .find(|&&m| registry.get(m.class).methods[m.index].params.is_empty())
            else {
                continue;
            };

            let setter_name = format!("set{}", upper_first(&property));
            let setters: Vec<MemberRef> = map
                .get(&setter_name)
                .into_iter()
                .flat_map(|member| match member {
                    Member::Methods(overloads) => overloads.clone(),
                    _ => Vec::new(),
                })
                .filter(|&m| registry.get(m.class).methods[m.index].params.len() == 1)
                .collect();

            let from_get = name.starts_with("get");
            let existing = beans
                .iter()
                .position(|(s, p, _, _)| *s == is_static && p == &property);
            match existing {
                Some(slot) => {
                    if from_get && !beans[slot].2 {
                        beans[slot] = (is_static, property, from_get, BeanProperty { getter, setters });
                    }
                }
                None => beans.push((is_static, property, from_get, BeanProperty { getter, setters })),
            }
        }
    }
    for (is_static, name, _, bean) in beans {
        members.insert(is_static, name, Member::Bean(bean));
    }

    members
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn collect(registry: &HostRegistry, id: HostClassId, members: &mut Members) {
    let class = registry.get(id);

    for parent in &class.supers {
        collect(registry, *parent, members);
    }

    for (index, field) in class.fields.iter().enumerate() {
        let name = effective_name(&class, &field.name);
        members.insert(field.is_static, name, Member::Field(MemberRef { class: id, index }));
    }

    for (index, method) in class.methods.iter().enumerate() {
        let name = effective_name(&class, &method.name);
        members.merge_method(method.is_static, name, MemberRef { class: id, index });
    }
}
