//! HTML serialization of a [`Document`] through html5ever's serializer.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::arena::{Document, NodeData, NodeId};

/// A node borrowed for serialization.
pub struct SerializableNode<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }
}

enum Op {
    Open(NodeId),
    Close(NodeId),
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut stack = match traversal_scope {
            TraversalScope::IncludeNode => vec![Op::Open(self.id)],
            TraversalScope::ChildrenOnly(_) => {
                let children: Vec<_> = self.doc.children(self.id).collect();
                children.into_iter().rev().map(Op::Open).collect()
            }
        };

        while let Some(op) = stack.pop() {
            let (id, open) = match op {
                Op::Open(id) => (id, true),
                Op::Close(id) => (id, false),
            };
            let Some(node) = self.doc.get(id) else {
                continue;
            };

            match &node.data {
                NodeData::Element { name, attrs, .. } => {
                    if !open {
                        serializer.end_elem(name.clone())?;
                        continue;
                    }
                    serializer.start_elem(
                        name.clone(),
                        attrs.iter().map(|a| (&a.name, a.value.as_str())),
                    )?;
                    stack.push(Op::Close(id));
                    let children: Vec<_> = self.doc.children(id).collect();
                    stack.extend(children.into_iter().rev().map(Op::Open));
                }
                NodeData::Text(text) => serializer.write_text(text)?,
                NodeData::Comment(text) => serializer.write_comment(text)?,
                NodeData::Doctype { name, .. } => serializer.write_doctype(name)?,
                NodeData::Document => {
                    let children: Vec<_> = self.doc.children(id).collect();
                    stack.extend(children.into_iter().rev().map(Op::Open));
                }
            }
        }
        Ok(())
    }
}

/// Serialize the whole document to HTML.
pub fn serialize_document(doc: &Document) -> io::Result<String> {
    write_node(doc, doc.document(), TraversalScope::ChildrenOnly(None))
}

/// Serialize a node and its subtree to HTML.
pub fn serialize_node(doc: &Document, id: NodeId) -> io::Result<String> {
    write_node(doc, id, TraversalScope::IncludeNode)
}

/// Serialize only the children of a node.
pub fn serialize_children(doc: &Document, id: NodeId) -> io::Result<String> {
    write_node(doc, id, TraversalScope::ChildrenOnly(None))
}

fn write_node(doc: &Document, id: NodeId, traversal_scope: TraversalScope) -> io::Result<String> {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    serialize(&mut bytes, &SerializableNode::new(doc, id), opts)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
