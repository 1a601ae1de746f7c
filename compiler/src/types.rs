use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Index of a node in a [`Schema`]. Parents and `extends` targets are held as
/// ids, so no node owns anything above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An immutable schema tree, stored as an arena of nodes.
///
/// Built once per compilation (by hand through the `add_*` methods, or from a
/// JSON document by [`crate::loader`]) and only read afterwards.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub base_name: String,
    pub number:    u32,
    pub parent:    Option<NodeId>,
    pub kind:      NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Typespace(Typespace),
    Trait(Trait),
    Struct(Struct),
    Enum(Enum),
    Command(Command),
    Field(Field),
    ConstantGroup(ConstantGroup),
    Constant(Constant),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Typespace(_) => "typespace",
            NodeKind::Trait(_) => "trait",
            NodeKind::Struct(_) => "struct",
            NodeKind::Enum(_) => "enum",
            NodeKind::Command(_) => "command",
            NodeKind::Field(_) => "field",
            NodeKind::ConstantGroup(_) => "constant group",
            NodeKind::Constant(_) => "constant",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Typespace {
    pub namespace:           String,
    pub version:             u32,
    pub enum_list:           Vec<NodeId>,
    pub struct_list:         Vec<NodeId>,
    pub constant_group_list: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    pub namespace:           String,
    pub version:             u32,
    pub vendor:              u16,
    pub extends:             Option<NodeId>,
    pub state_list:          Vec<NodeId>,
    pub enum_list:           Vec<NodeId>,
    pub command_list:        Vec<NodeId>,
    pub constant_group_list: Vec<NodeId>,
    pub struct_list:         Vec<NodeId>,
    pub event_list:          Vec<NodeId>,
}

impl Default for Trait {
    fn default() -> Self {
        Trait {
            namespace:           String::new(),
            version:             1,
            vendor:              0,
            extends:             None,
            state_list:          Vec::new(),
            enum_list:           Vec::new(),
            command_list:        Vec::new(),
            constant_group_list: Vec::new(),
            struct_list:         Vec::new(),
            event_list:          Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    ProductionCritical,
    ProductionStandard,
    Info,
    Debug,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    pub namespace:   String,
    pub is_standard: bool,
    pub field_list:  Vec<NodeId>,
    /// Set on structs that live in a trait's event list.
    pub importance:  Option<Importance>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumPair {
    pub base_name: String,
    pub number:    u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enum {
    pub namespace:  String,
    pub is_bitmask: bool,
    pub pair_list:  Vec<EnumPair>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    pub parameter_list: Vec<NodeId>,
    pub response:       Option<NodeId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Float,
    Double,
    Int64,
    Uint64,
    Int32,
    #[default]
    Uint32,
    Bool,
    String,
    Bytes,
    Enum,
    Struct,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub data_type:    DataType,
    pub is_optional:  bool,
    pub is_nullable:  bool,
    pub is_map:       bool,
    pub is_ephemeral: bool,
    pub is_array:     bool,
    /// Well-known types are addressed as a single property.
    pub is_standard:  bool,
    pub field_list:   Vec<NodeId>,
    pub map_value:    Option<NodeId>,
}

impl Field {
    /// Struct-typed fields have children that get their own handles.
    pub fn is_struct(&self) -> bool {
        self.data_type == DataType::Struct || !self.field_list.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantGroup {
    pub constant_list: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    /// Symbolic value as written in the schema, e.g. `DEVICE_18B4300000000001`.
    pub value: String,
}

impl Schema {
    pub fn new() -> Schema {
        Schema::default()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes (traits, typespaces, standalone structs and enums) in
    /// the order they were added.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn base_name(&self, id: NodeId) -> &str {
        &self.node(id).base_name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn field(&self, id: NodeId) -> Option<&Field> {
        match &self.node(id).kind {
            NodeKind::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn trait_(&self, id: NodeId) -> Option<&Trait> {
        match &self.node(id).kind {
            NodeKind::Trait(t) => Some(t),
            _ => None,
        }
    }

    pub fn constant(&self, id: NodeId) -> Option<&Constant> {
        match &self.node(id).kind {
            NodeKind::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Namespace of the node, or of the closest ancestor that has one.
    pub fn namespace(&self, id: NodeId) -> &str {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.node(id);
            let namespace = match &node.kind {
                NodeKind::Typespace(t) => t.namespace.as_str(),
                NodeKind::Trait(t) => t.namespace.as_str(),
                NodeKind::Struct(s) => s.namespace.as_str(),
                NodeKind::Enum(e) => e.namespace.as_str(),
                _ => "",
            };
            if !namespace.is_empty() {
                return namespace;
            }
            current = node.parent;
        }
        ""
    }

    /// Dotted name used in diagnostics: `namespace.Name` for top-level nodes,
    /// `Parent.child` below them.
    pub fn full_name(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.parent {
            Some(parent) => format!("{}.{}", self.full_name(parent), node.base_name),
            None => {
                let namespace = self.namespace(id);
                if namespace.is_empty() {
                    node.base_name.clone()
                } else {
                    format!("{}.{}", namespace, node.base_name)
                }
            }
        }
    }

    /// Every owned child list of a node, labelled. Sibling uniqueness is
    /// checked per list.
    pub fn child_lists(&self, id: NodeId) -> Vec<(&'static str, &[NodeId])> {
        match &self.node(id).kind {
            NodeKind::Typespace(t) => vec![
                ("enum_list", t.enum_list.as_slice()),
                ("struct_list", t.struct_list.as_slice()),
                ("constant_group_list", t.constant_group_list.as_slice()),
            ],
            NodeKind::Trait(t) => vec![
                ("state_list", t.state_list.as_slice()),
                ("enum_list", t.enum_list.as_slice()),
                ("command_list", t.command_list.as_slice()),
                ("constant_group_list", t.constant_group_list.as_slice()),
                ("struct_list", t.struct_list.as_slice()),
                ("event_list", t.event_list.as_slice()),
            ],
            NodeKind::Struct(s) => vec![("field_list", s.field_list.as_slice())],
            NodeKind::Command(c) => {
                let mut lists = vec![("parameter_list", c.parameter_list.as_slice())];
                if let Some(response) = &c.response {
                    lists.push(("response", std::slice::from_ref(response)));
                }
                lists
            }
            NodeKind::Field(f) => {
                let mut lists = vec![("field_list", f.field_list.as_slice())];
                if let Some(value) = &f.map_value {
                    lists.push(("map_value", std::slice::from_ref(value)));
                }
                lists
            }
            NodeKind::ConstantGroup(g) => vec![("constant_list", g.constant_list.as_slice())],
            NodeKind::Enum(_) | NodeKind::Constant(_) => Vec::new(),
        }
    }

    /// True if `ancestor` is `id` or one of its parents.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|node| node.parent);
        }
        false
    }

    // Construction. Each `add_*` appends the new node to the matching list of
    // its parent and returns its id.

    pub fn add_typespace(&mut self, namespace: &str, base_name: &str) -> NodeId {
        let id = self.push(base_name, 0, None, NodeKind::Typespace(Typespace {
            namespace: namespace.to_string(),
            version: 1,
            ..Typespace::default()
        }));
        self.roots.push(id);
        id
    }

    pub fn add_trait(&mut self, namespace: &str, base_name: &str, number: u32) -> NodeId {
        let id = self.push(base_name, number, None, NodeKind::Trait(Trait {
            namespace: namespace.to_string(),
            ..Trait::default()
        }));
        self.roots.push(id);
        id
    }

    /// A struct under a trait or typespace, or a standalone one when `parent`
    /// is `None`.
    pub fn add_struct(
        &mut self,
        parent: Option<NodeId>,
        namespace: &str,
        base_name: &str,
        number: u32,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, number, parent, NodeKind::Struct(Struct {
            namespace: namespace.to_string(),
            ..Struct::default()
        }));
        match parent {
            None => self.roots.push(id),
            Some(p) => match &mut self.nodes[p.0].kind {
                NodeKind::Trait(t) => t.struct_list.push(id),
                NodeKind::Typespace(t) => t.struct_list.push(id),
                _ => return Err(self.misplaced(id, p)),
            },
        }
        Ok(id)
    }

    pub fn add_event(
        &mut self,
        parent: NodeId,
        base_name: &str,
        number: u32,
        importance: Importance,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, number, Some(parent), NodeKind::Struct(Struct {
            importance: Some(importance),
            ..Struct::default()
        }));
        match &mut self.nodes[parent.0].kind {
            NodeKind::Trait(t) => t.event_list.push(id),
            _ => return Err(self.misplaced(id, parent)),
        }
        Ok(id)
    }

    pub fn add_enum(
        &mut self,
        parent: Option<NodeId>,
        namespace: &str,
        base_name: &str,
        number: u32,
        pairs: &[(&str, u32)],
    ) -> Result<NodeId, CompileError> {
        let pair_list = pairs
            .iter()
            .map(|(name, number)| EnumPair {
                base_name: name.to_string(),
                number:    *number,
            })
            .collect();
        let id = self.push(base_name, number, parent, NodeKind::Enum(Enum {
            namespace: namespace.to_string(),
            is_bitmask: false,
            pair_list,
        }));
        match parent {
            None => self.roots.push(id),
            Some(p) => match &mut self.nodes[p.0].kind {
                NodeKind::Trait(t) => t.enum_list.push(id),
                NodeKind::Typespace(t) => t.enum_list.push(id),
                _ => return Err(self.misplaced(id, p)),
            },
        }
        Ok(id)
    }

    pub fn add_command(
        &mut self,
        parent: NodeId,
        base_name: &str,
        number: u32,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, number, Some(parent), NodeKind::Command(Command::default()));
        match &mut self.nodes[parent.0].kind {
            NodeKind::Trait(t) => t.command_list.push(id),
            _ => return Err(self.misplaced(id, parent)),
        }
        Ok(id)
    }

    /// The response struct of a command.
    pub fn add_response(
        &mut self,
        command: NodeId,
        base_name: &str,
        number: u32,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, number, Some(command), NodeKind::Struct(Struct::default()));
        match &mut self.nodes[command.0].kind {
            NodeKind::Command(c) if c.response.is_none() => c.response = Some(id),
            _ => return Err(self.misplaced(id, command)),
        }
        Ok(id)
    }

    /// A field under a trait (state), struct, event, command (parameter) or
    /// another field (struct-typed member).
    pub fn add_field(
        &mut self,
        parent: NodeId,
        base_name: &str,
        number: u32,
        field: Field,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, number, Some(parent), NodeKind::Field(field));
        match &mut self.nodes[parent.0].kind {
            NodeKind::Trait(t) => t.state_list.push(id),
            NodeKind::Struct(s) => s.field_list.push(id),
            NodeKind::Command(c) => c.parameter_list.push(id),
            NodeKind::Field(f) => {
                f.data_type = DataType::Struct;
                f.field_list.push(id);
            }
            _ => return Err(self.misplaced(id, parent)),
        }
        Ok(id)
    }

    /// The value side of a dictionary field. Its number is always 0.
    pub fn set_map_value(
        &mut self,
        map: NodeId,
        base_name: &str,
        field: Field,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, 0, Some(map), NodeKind::Field(field));
        match &mut self.nodes[map.0].kind {
            NodeKind::Field(f) if f.map_value.is_none() => {
                f.is_map = true;
                f.map_value = Some(id);
            }
            _ => return Err(self.misplaced(id, map)),
        }
        Ok(id)
    }

    pub fn add_constant_group(
        &mut self,
        parent: NodeId,
        base_name: &str,
        number: u32,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, number, Some(parent), NodeKind::ConstantGroup(ConstantGroup::default()));
        match &mut self.nodes[parent.0].kind {
            NodeKind::Trait(t) => t.constant_group_list.push(id),
            NodeKind::Typespace(t) => t.constant_group_list.push(id),
            _ => return Err(self.misplaced(id, parent)),
        }
        Ok(id)
    }

    pub fn add_constant(
        &mut self,
        group: NodeId,
        base_name: &str,
        number: u32,
        value: &str,
    ) -> Result<NodeId, CompileError> {
        let id = self.push(base_name, number, Some(group), NodeKind::Constant(Constant {
            value: value.to_string(),
        }));
        match &mut self.nodes[group.0].kind {
            NodeKind::ConstantGroup(g) => g.constant_list.push(id),
            _ => return Err(self.misplaced(id, group)),
        }
        Ok(id)
    }

    pub fn set_version(&mut self, id: NodeId, version: u32) -> Result<(), CompileError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Trait(t) => t.version = version,
            NodeKind::Typespace(t) => t.version = version,
            _ => return Err(self.unsupported(id, "a version")),
        }
        Ok(())
    }

    pub fn set_vendor(&mut self, id: NodeId, vendor: u16) -> Result<(), CompileError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Trait(t) => t.vendor = vendor,
            _ => return Err(self.unsupported(id, "a vendor")),
        }
        Ok(())
    }

    /// Record that `id` extends `base`. The target is only checked to be a
    /// trait (and the chain acyclic) at verification time.
    pub fn set_extends(&mut self, id: NodeId, base: NodeId) -> Result<(), CompileError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Trait(t) => t.extends = Some(base),
            _ => return Err(self.unsupported(id, "an extends target")),
        }
        Ok(())
    }

    pub fn set_standard(&mut self, id: NodeId, is_standard: bool) -> Result<(), CompileError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Struct(s) => s.is_standard = is_standard,
            NodeKind::Field(f) => f.is_standard = is_standard,
            _ => return Err(self.unsupported(id, "a standard flag")),
        }
        Ok(())
    }

    pub fn set_bitmask(&mut self, id: NodeId, is_bitmask: bool) -> Result<(), CompileError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Enum(e) => e.is_bitmask = is_bitmask,
            _ => return Err(self.unsupported(id, "a bitmask flag")),
        }
        Ok(())
    }

    fn push(&mut self, base_name: &str, number: u32, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            base_name: base_name.to_string(),
            number,
            parent,
            kind,
        });
        id
    }

    fn misplaced(&mut self, id: NodeId, parent: NodeId) -> CompileError {
        let child = self.nodes.pop().map(|n| n.kind.label()).unwrap_or("node");
        debug_assert_eq!(id.0, self.nodes.len());
        CompileError::integrity(
            self.full_name(parent),
            self.base_name(parent).to_string(),
            format!("a {} cannot hold a {}", self.node(parent).kind.label(), child),
        )
    }

    fn unsupported(&self, id: NodeId, what: &str) -> CompileError {
        CompileError::integrity(
            self.full_name(id),
            self.base_name(id).to_string(),
            format!("a {} cannot carry {}", self.node(id).kind.label(), what),
        )
    }
}
