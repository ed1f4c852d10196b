//! Build script for dupsweep
//!
//! Windows only: embeds the application manifest so paths longer than
//! 260 characters (MAX_PATH) can be scanned, backed up and deleted.
//!
//! The manifest (`dupsweep.manifest`) sets `longPathAware=true`, which
//! together with the Windows 10 v1607+ registry setting allows paths up to
//! 32,767 characters. On other platforms this script does nothing.

fn main() {
    #[cfg(windows)]
    {
        // The .rc file embeds the XML manifest as an RT_MANIFEST resource
        let _ = embed_resource::compile("dupsweep.rc", embed_resource::NONE);

        println!("cargo:rerun-if-changed=dupsweep.rc");
        println!("cargo:rerun-if-changed=dupsweep.manifest");
    }
}
