use mpl_token_metadata::{
    accounts::Metadata,
    instructions::{CreateMetadataAccountV3Builder, UpdateMetadataAccountV2Builder},
    types::DataV2,
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, sysvar};

use crate::error::MetadataError;

pub use mpl_token_metadata::ID as METADATA_PROGRAM_ID;

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataField {
    Name,
    Symbol,
    Uri,
}

impl MetadataField {
    pub fn label(self) -> &'static str {
        match self {
            MetadataField::Name => "name",
            MetadataField::Symbol => "symbol",
            MetadataField::Uri => "URI",
        }
    }

    pub fn max_len(self) -> usize {
        match self {
            MetadataField::Name => MAX_NAME_LENGTH,
            MetadataField::Symbol => MAX_SYMBOL_LENGTH,
            MetadataField::Uri => MAX_URI_LENGTH,
        }
    }

    pub fn check(self, value: &str) -> Result<(), MetadataError> {
        if value.len() > self.max_len() {
            return Err(MetadataError::TooLong {
                field: self.label(),
                len: value.len(),
                max: self.max_len(),
            });
        }
        Ok(())
    }
}

pub fn fungible_data(name: &str, symbol: &str, uri: &str) -> DataV2 {
    DataV2 {
        name: name.to_string(),
        symbol: symbol.to_string(),
        uri: uri.to_string(),
        seller_fee_basis_points: 0,
        creators: None,
        collection: None,
        uses: None,
    }
}

pub fn set_field(data: &mut DataV2, field: MetadataField, value: &str) {
    let slot = match field {
        MetadataField::Name => &mut data.name,
        MetadataField::Symbol => &mut data.symbol,
        MetadataField::Uri => &mut data.uri,
    };
    *slot = value.to_string();
}

pub fn validate(data: &DataV2) -> Result<(), MetadataError> {
    MetadataField::Name.check(&data.name)?;
    MetadataField::Symbol.check(&data.symbol)?;
    MetadataField::Uri.check(&data.uri)
}

pub fn find_metadata_address(mint: &Pubkey) -> Pubkey {
    Metadata::find_pda(mint).0
}

pub fn decode_metadata(address: &Pubkey, bytes: &[u8]) -> Result<Metadata, MetadataError> {
    let mut metadata =
        Metadata::safe_deserialize(bytes).map_err(|_| MetadataError::Undecodable(*address))?;
    // Fixed-width strings are padded with NULs on chain.
    for s in [&mut metadata.name, &mut metadata.symbol, &mut metadata.uri] {
        let trimmed = s.trim_end_matches('\0').len();
        s.truncate(trimmed);
    }
    Ok(metadata)
}

pub fn current_data(metadata: &Metadata) -> DataV2 {
    DataV2 {
        name: metadata.name.clone(),
        symbol: metadata.symbol.clone(),
        uri: metadata.uri.clone(),
        seller_fee_basis_points: metadata.seller_fee_basis_points,
        creators: metadata.creators.clone(),
        collection: metadata.collection.clone(),
        uses: metadata.uses.clone(),
    }
}

// `authority` signs as mint authority, payer and update authority.
pub fn create_metadata_instruction(mint: &Pubkey, authority: &Pubkey, data: DataV2) -> Instruction {
    CreateMetadataAccountV3Builder::new()
        .metadata(find_metadata_address(mint))
        .mint(*mint)
        .mint_authority(*authority)
        .payer(*authority)
        .update_authority(*authority, true)
        .rent(Some(sysvar::rent::id()))
        .data(data)
        .is_mutable(true)
        .instruction()
}

pub fn update_metadata_instruction(
    metadata: &Pubkey,
    update_authority: &Pubkey,
    data: DataV2,
) -> Instruction {
    UpdateMetadataAccountV2Builder::new()
        .metadata(*metadata)
        .update_authority(*update_authority)
        .data(data)
        .is_mutable(true)
        .instruction()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn borsh_string(s: &str, width: usize) -> Vec<u8> {
        let padded = format!("{s}{}", "\0".repeat(width - s.len()));
        borsh::to_vec(&padded).unwrap()
    }

    // Gold Coin / GOLD, laid out as the program allocates it.
    pub(crate) fn account_bytes(mint: &Pubkey, authority: &Pubkey, is_mutable: bool) -> Vec<u8> {
        let mut bytes = vec![4u8]; // Key::MetadataV1
        bytes.extend_from_slice(authority.as_ref());
        bytes.extend_from_slice(mint.as_ref());
        bytes.extend(borsh_string("Gold Coin", MAX_NAME_LENGTH));
        bytes.extend(borsh_string("GOLD", MAX_SYMBOL_LENGTH));
        bytes.extend(borsh_string("https://example.com/gold.json", MAX_URI_LENGTH));
        // seller fee, no creators, primary sale, mutability, edition nonce, fungible standard
        bytes.extend(
            borsh::to_vec(&(0u16, None::<u8>, false, is_mutable, Some(254u8), Some(2u8))).unwrap(),
        );
        bytes.resize(679, 0);
        bytes
    }

    pub(crate) fn has_borsh_string(data: &[u8], s: &str) -> bool {
        let encoded = borsh::to_vec(&s.to_string()).unwrap();
        data.windows(encoded.len()).any(|w| w == encoded.as_slice())
    }

    #[test]
    fn metadata_address_is_deterministic_pda() {
        let mint = Pubkey::new_unique();
        let a = find_metadata_address(&mint);
        assert_eq!(a, find_metadata_address(&mint));
        assert_ne!(a, find_metadata_address(&Pubkey::new_unique()));
        assert!(!a.is_on_curve());

        let (expected, _) = Pubkey::find_program_address(
            &[b"metadata", METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
            &METADATA_PROGRAM_ID,
        );
        assert_eq!(a, expected);
    }

    #[test]
    fn create_instruction_signers() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let ix = create_metadata_instruction(&mint, &authority, fungible_data("Gold", "GLD", ""));

        assert_eq!(ix.program_id, METADATA_PROGRAM_ID);
        assert_eq!(ix.accounts.len(), 7);
        assert_eq!(ix.accounts[0].pubkey, find_metadata_address(&mint));
        assert!(ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, mint);
        assert!(ix.accounts[2].is_signer);
        assert!(ix.accounts[3].is_signer && ix.accounts[3].is_writable);
        assert!(ix.accounts[4].is_signer);
        assert!(has_borsh_string(&ix.data, "Gold"));
    }

    #[test]
    fn update_instruction_carries_data() {
        let metadata = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let ix = update_metadata_instruction(&metadata, &authority, fungible_data("A", "B", "https://c"));

        assert_eq!(ix.program_id, METADATA_PROGRAM_ID);
        assert_eq!(ix.accounts.len(), 2);
        assert_eq!(ix.accounts[0].pubkey, metadata);
        assert!(ix.accounts[1].is_signer);
        assert!(has_borsh_string(&ix.data, "https://c"));
    }

    #[test]
    fn decodes_padded_account() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let address = find_metadata_address(&mint);
        let decoded = decode_metadata(&address, &account_bytes(&mint, &authority, true)).unwrap();

        assert_eq!(decoded.name, "Gold Coin");
        assert_eq!(decoded.symbol, "GOLD");
        assert_eq!(decoded.uri, "https://example.com/gold.json");
        assert_eq!(decoded.update_authority, authority);
        assert_eq!(decoded.mint, mint);
        assert!(decoded.is_mutable);
        assert_eq!(
            current_data(&decoded),
            fungible_data("Gold Coin", "GOLD", "https://example.com/gold.json")
        );
    }

    #[test]
    fn truncated_account_is_undecodable() {
        let address = Pubkey::new_unique();
        assert!(matches!(
            decode_metadata(&address, &[4, 1, 2]),
            Err(MetadataError::Undecodable(_))
        ));
    }

    #[test]
    fn set_replaces_one_field_and_validates_lengths() {
        let mut data = fungible_data("Gold", "GLD", "https://a");
        set_field(&mut data, MetadataField::Symbol, "AU");
        assert_eq!(data, fungible_data("Gold", "AU", "https://a"));

        set_field(&mut data, MetadataField::Symbol, "WAYTOOLONGSYMBOL");
        assert!(matches!(
            validate(&data),
            Err(MetadataError::TooLong { field: "symbol", max: 10, .. })
        ));
    }
}
