//! Output helpers for binaries and result types.

/// Create a directory and all its parents if it does not already exist.
///
/// Evaluates to a `std::io::Result<()>`.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        {
            let dir: &std::path::Path = ($dir).as_ref();
            if dir.is_dir() {
                std::io::Result::Ok(())
            } else {
                std::fs::create_dir_all(dir)
            }
        }
    }
}

/// Write a set of named arrays to a `.npz` archive.
///
/// ```ignore
/// write_npz!(
///     outdir.join("data.npz"),
///     arrays: {
///         "x" => &x,
///         "y" => &y,
///     }
/// )?;
/// ```
///
/// Evaluates to a `doppler_obe::error::Result<()>`.
#[macro_export]
macro_rules! write_npz {
    (
        $filename:expr,
        arrays: { $( $name:expr => $arr:expr ),+ $(,)? }
    ) => {
        (|| -> $crate::error::Result<()> {
            let file = std::fs::File::create($filename)?;
            let mut npz = $crate::ndarray_npy::NpzWriter::new(file);
            $(
                npz.add_array($name, $arr)?;
            )+
            npz.finish()?;
            Ok(())
        })()
    }
}
