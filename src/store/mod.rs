// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence: the JSON document codec, key-value stores, file export/import
//! and the debounced auto-save timer.

pub mod autosave;
pub mod codec;
pub mod kv;

#[cfg(test)]
pub(crate) mod test_support;

pub use autosave::{Autosave, DEFAULT_AUTOSAVE_DELAY};
pub use codec::{
    decode, decode_with_node_size, encode, encode_pretty, parse, DiagramDocument,
    MalformedDocumentError,
};
pub use kv::{
    export_to_file, import_from_file, read_document, DiagramStore, FolderStore, MemoryStore,
    StoreError, WriteDurability,
};
