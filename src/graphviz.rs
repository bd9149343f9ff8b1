use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::index::{IndexType, NodeIndex};
use crate::intervalset::IntervalSet;
use crate::node::Node;

impl<Ix> IntervalSet<Ix>
where
    Ix: IndexType,
{
    /// Write the tree to `path` in Graphviz dot format.
    ///
    /// Each node is labelled with its interval and subtree max and drawn in its
    /// red-black color.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating or writing the file.
    pub fn draw(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_dot(&mut out)?;
        out.flush()
    }

    /// Write the tree in Graphviz dot format.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_dot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "digraph interval_set {{")?;
        writeln!(out, "    node [shape=box fontname=monospace]")?;
        self.write_dot_inner(out, self.root)?;
        writeln!(out, "}}")
    }

    fn write_dot_inner<W: Write>(&self, out: &mut W, x: NodeIndex<Ix>) -> io::Result<()> {
        if self.is_sentinel(x) {
            return Ok(());
        }
        let color = if self.node_ref(x, Node::is_red) {
            "red"
        } else {
            "black"
        };
        writeln!(
            out,
            "    n{} [label=\"{}\\nmax={}\" color={}]",
            x.index(),
            self.node_ref(x, Node::interval),
            self.node_ref(x, Node::max),
            color
        )?;
        for child in [
            self.node_ref(x, Node::left),
            self.node_ref(x, Node::right),
        ] {
            if !self.is_sentinel(child) {
                writeln!(out, "    n{} -> n{}", x.index(), child.index())?;
                self.write_dot_inner(out, child)?;
            }
        }
        Ok(())
    }
}
