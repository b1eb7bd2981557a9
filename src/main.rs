//! Panorender CLI - panorama rendering tool.
//!
//! Convert equirectangular panoramas to cube maps and render perspective
//! views from the command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use panorender::export::{
    export_cubemap_cross, export_cubemap_faces, save_rgb_png, PngExportOptions,
};
use panorender::{build_cubemap, project, project_equirect, Camera, Equirect};

/// Panorama cube-map conversion and perspective rendering.
#[derive(Parser)]
#[command(name = "panorender")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an equirectangular panorama to a cube map.
    Cubemap {
        /// Input panorama image (width must be a multiple of 4).
        input: PathBuf,

        /// Output directory for the face images.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "pano")]
        name: String,

        /// Also export the unfolded cross as a single image.
        #[arg(long)]
        cross: bool,
    },
    /// Render a perspective view of a panorama.
    Project {
        /// Input panorama image.
        input: PathBuf,

        /// Output image path.
        #[arg(short, long, default_value = "view.png")]
        output: PathBuf,

        /// Camera yaw in degrees, [0, 360).
        #[arg(long, default_value = "0")]
        yaw: f64,

        /// Camera pitch in degrees, [1, 179]; 90 is horizontal.
        #[arg(long, default_value = "90")]
        pitch: f64,

        /// Field of view in degrees, [15, 90].
        #[arg(long, default_value = "90")]
        fov: f64,

        /// Output width in pixels.
        #[arg(long, default_value = "512")]
        width: u32,

        /// Output height in pixels.
        #[arg(long, default_value = "512")]
        height: u32,

        /// Sample the panorama directly instead of building a cube map.
        #[arg(long)]
        no_cubemap: bool,
    },
}

fn load_panorama(path: &PathBuf) -> (Vec<u8>, u32, u32) {
    let img = match image::open(path) {
        Ok(img) => img.to_rgb8(),
        Err(err) => {
            eprintln!("Error: cannot open {}: {}", path.display(), err);
            process::exit(1);
        }
    };
    let (width, height) = img.dimensions();
    if height != width / 2 {
        eprintln!(
            "Warning: {}x{} is not a 2:1 panorama; vertical coverage will be off",
            width, height
        );
    }
    (img.into_raw(), width, height)
}

fn validate_camera(camera: &Camera) {
    if !(0.0..360.0).contains(&camera.yaw) {
        eprintln!("Error: yaw must be in [0, 360)");
        process::exit(1);
    }
    if !(1.0..=179.0).contains(&camera.pitch) {
        eprintln!("Error: pitch must be between 1 and 179");
        process::exit(1);
    }
    if !(15.0..=90.0).contains(&camera.fov) {
        eprintln!("Error: fov must be between 15 and 90");
        process::exit(1);
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Cubemap {
            input,
            output,
            name,
            cross,
        } => run_cubemap(input, output, name, cross),
        Commands::Project {
            input,
            output,
            yaw,
            pitch,
            fov,
            width,
            height,
            no_cubemap,
        } => run_project(input, output, Camera::new(yaw, pitch, fov), width, height, no_cubemap),
    }
}

fn run_cubemap(input: PathBuf, output: PathBuf, name: String, cross: bool) {
    let (data, width, height) = load_panorama(&input);
    if width % 4 != 0 {
        eprintln!("Error: panorama width {} is not a multiple of 4", width);
        process::exit(1);
    }
    let pano = match Equirect::new(&data, width, height) {
        Ok(pano) => pano,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };

    println!("Panorama: {}x{}, face edge {}", width, height, width / 4);
    let start = Instant::now();
    let cancel = AtomicBool::new(false);
    let cubemap = match build_cubemap(&pano, &cancel) {
        Ok(cubemap) => cubemap,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };
    println!("Cube map built in {:.2?}", start.elapsed());

    let options = PngExportOptions::default();
    if let Err(err) = export_cubemap_faces(&cubemap, &output, &name, &options) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
    if cross {
        let path = output.join(format!("{}_cross.png", name));
        if let Err(err) = export_cubemap_cross(&cubemap, &path, &options) {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
    println!("Exported faces to {}", output.display());
}

fn run_project(
    input: PathBuf,
    output: PathBuf,
    camera: Camera,
    width: u32,
    height: u32,
    no_cubemap: bool,
) {
    validate_camera(&camera);
    if width == 0 || height == 0 {
        eprintln!("Error: output dimensions must be nonzero");
        process::exit(1);
    }
    let (data, pano_width, pano_height) = load_panorama(&input);
    let pano = match Equirect::new(&data, pano_width, pano_height) {
        Ok(pano) => pano,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };

    println!(
        "Rendering {}x{} view at yaw {}, pitch {}, fov {}",
        width, height, camera.yaw, camera.pitch, camera.fov
    );
    let start = Instant::now();
    let result = if no_cubemap || pano_width % 4 != 0 {
        if !no_cubemap {
            eprintln!(
                "Warning: width {} is not a multiple of 4, sampling the panorama directly",
                pano_width
            );
        }
        project_equirect(&pano, width, height, camera)
    } else {
        let cancel = AtomicBool::new(false);
        match build_cubemap(&pano, &cancel) {
            Ok(cubemap) => project(&cubemap, width, height, camera),
            Err(err) => {
                eprintln!("Error: {}", err);
                process::exit(1);
            }
        }
    };
    let view = match result {
        Ok(view) => view,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };
    println!("Rendered in {:.2?}", start.elapsed());

    if let Err(err) = save_rgb_png(&view, width, height, &output, &PngExportOptions::default()) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
    println!("Saved {}", output.display());
}
