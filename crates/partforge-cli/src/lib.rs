//! Command implementations behind the `partforge` binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use assembly_engine::{build, build_current_limit_box, PartBuild};
use clap::ValueEnum;
use csg_kernel::{Deflection, Kernel, KernelIntrospect, MeshKernel, RenderMesh};
use design_params::{DesignParameterSet, Product};
use file_format::{
    export_ascii_stl, export_binary_stl, save_assembly, AssemblyDocument, AssemblyMetadata,
    OutputPaths, PartRecord,
};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProductArg {
    /// The current-limit lamp enclosure.
    CurrentLimitBox,
    /// The holder and gusset bracket for spline roadbed.
    SplineBracket,
}

impl From<ProductArg> for Product {
    fn from(arg: ProductArg) -> Self {
        match arg {
            ProductArg::CurrentLimitBox => Product::CurrentLimitBox,
            ProductArg::SplineBracket => Product::SplineBracket,
        }
    }
}

/// Where a build's parameters come from.
#[derive(Debug, Clone)]
pub struct ParamSource {
    pub product: Product,
    /// Shipped revision; the newest one when absent.
    pub revision: Option<u32>,
    /// JSON object of overrides applied on top of the revision.
    pub overrides: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub params: ParamSource,
    pub out: PathBuf,
    pub ascii: bool,
}

/// One line of the build summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PartSummary {
    pub name: &'static str,
    pub volume: f64,
    pub solid_count: usize,
    pub face_count: usize,
    pub diagnostics: Vec<String>,
}

impl std::fmt::Display for PartSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: volume {:.3} mm^3, {} solid(s), {} faces",
            self.name, self.volume, self.solid_count, self.face_count
        )?;
        for d in &self.diagnostics {
            write!(f, "\n  warning: {d}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub parts: Vec<PartSummary>,
    pub written: Vec<PathBuf>,
}

pub fn resolve_params(source: &ParamSource) -> Result<DesignParameterSet> {
    let base = match source.revision {
        Some(revision) => DesignParameterSet::builtin(source.product, revision)?,
        None => DesignParameterSet::latest(source.product),
    };
    let Some(path) = &source.overrides else {
        return Ok(base);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading parameter file {}", path.display()))?;
    let overrides: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing parameter file {}", path.display()))?;
    Ok(base.with_overrides(&overrides)?)
}

/// `partforge params`: the parameter set as pretty JSON.
pub fn params_json(source: &ParamSource) -> Result<String> {
    let set = resolve_params(source)?;
    Ok(serde_json::to_string_pretty(&set)?)
}

/// `partforge build`: build every part and write all outputs.
///
/// Diagnostics never stop the export; only fatal errors do.
#[instrument(skip_all, fields(product = options.params.product.name(), out = %options.out.display()))]
pub fn run_build(options: &BuildOptions) -> Result<BuildReport> {
    let set = resolve_params(&options.params)?;
    let assembly = set.product().name();
    let paths = OutputPaths::new(&options.out);
    paths
        .create_dirs()
        .with_context(|| format!("creating output folders under {}", options.out.display()))?;

    let mut kernel = MeshKernel::new(Deflection::STANDARD);
    let parts = build(&mut kernel, &set).with_context(|| format!("building {assembly}"))?;

    let mut document = AssemblyDocument::new(AssemblyMetadata::new(assembly), set.clone());
    let mut report = BuildReport {
        parts: Vec::new(),
        written: Vec::new(),
    };

    for part in parts {
        let name = part.part.name();
        let mesh = kernel
            .tessellate(part.body.handle())
            .with_context(|| format!("tessellating {name}"))?;
        let path = paths.part_stl(name);
        write_stl(&path, &mesh, name, options.ascii)?;
        report.written.push(path);

        let summary = summarize(&part);
        document.parts.push(PartRecord {
            name: name.to_string(),
            volume: summary.volume,
            solid_count: summary.solid_count,
            face_count: summary.face_count,
            diagnostics: summary.diagnostics.clone(),
            mesh,
        });
        report.parts.push(summary);
        part.body.release(&mut kernel);
    }

    // The enclosure also ships a finer mesh for printing.
    if let DesignParameterSet::CurrentLimitBox(params) = &set {
        let mut fine = MeshKernel::new(Deflection::FINE);
        let part = build_current_limit_box(&mut fine, params)
            .with_context(|| format!("building fine {assembly}"))?;
        let mesh = fine
            .tessellate(part.body.handle())
            .context("tessellating fine mesh")?;
        info!(
            triangles = mesh.triangle_count(),
            volume = fine.volume(part.body.handle()),
            "fine mesh"
        );
        let path = paths.meshed_stl(assembly);
        write_stl(&path, &mesh, assembly, options.ascii)?;
        report.written.push(path);
        part.body.release(&mut fine);
    }

    let path = paths.assembly_document(assembly);
    std::fs::write(&path, save_assembly(&document))
        .with_context(|| format!("writing {}", path.display()))?;
    report.written.push(path);

    Ok(report)
}

fn summarize(part: &PartBuild) -> PartSummary {
    PartSummary {
        name: part.part.name(),
        volume: part.validation.volume,
        solid_count: part.validation.solid_count,
        face_count: part.validation.face_count,
        diagnostics: part.diagnostics.iter().map(ToString::to_string).collect(),
    }
}

fn write_stl(path: &Path, mesh: &RenderMesh, name: &str, ascii: bool) -> Result<()> {
    let bytes = if ascii {
        export_ascii_stl(mesh, name)?.into_bytes()
    } else {
        export_binary_stl(mesh, name)?
    };
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), triangles = mesh.triangle_count(), "wrote STL");
    Ok(())
}
