//! Small Brick models shared by the graph, metadata and pipeline tests.

/// Boiler A feeds VAV_X directly; boiler B feeds VAV_Y through heat exchanger M.
/// Each terminal unit serves its own zone and carries a couple of BACnet points.
pub(crate) const TWO_BOILER_MODEL: &str = r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix brick: <https://brickschema.org/schema/Brick#> .
@prefix dbc: <urn:dbc#> .
@prefix unit: <http://qudt.org/vocab/unit/> .
@prefix bldg: <urn:bldg/> .

brick:VAV rdfs:subClassOf brick:Terminal_Unit .
brick:Hot_Water_Boiler rdfs:subClassOf brick:Boiler .

bldg:BLR_A a brick:Boiler ;
    brick:feeds bldg:VAV_X .

bldg:BLR_B a brick:Hot_Water_Boiler ;
    brick:feeds bldg:HX_M .

bldg:HX_M a brick:Heat_Exchanger ;
    brick:feeds bldg:VAV_Y .

bldg:VAV_X a brick:VAV, brick:Terminal_Unit ;
    brick:feeds bldg:Air_Zone_X .

bldg:VAV_Y a brick:VAV ;
    brick:feeds bldg:Radiant_Zone_Y .

bldg:Air_Zone_X a brick:HVAC_Zone .
bldg:Radiant_Zone_Y a brick:HVAC_Zone .

bldg:NET_1 dbc:connstring "192.168.1.10:47808" .

bldg:VAV_X_POS a brick:Position_Sensor ;
    brick:isPointOf bldg:VAV_X ;
    brick:hasUnit unit:PERCENT ;
    brick:bacnetPoint bldg:VAV_X_POS_bn .
bldg:VAV_X_POS_bn brick:hasBacnetDeviceInstance "3000112" ;
    brick:hasBacnetDeviceType "analog-input" ;
    brick:accessedAt bldg:NET_1 .

bldg:VAV_X_CMD a brick:Valve_Command ;
    brick:isPointOf bldg:VAV_X ;
    brick:bacnetPoint bldg:VAV_X_CMD_bn .
bldg:VAV_X_CMD_bn brick:hasBacnetDeviceInstance 3000113.0 ;
    brick:hasBacnetDeviceType "analog-output" ;
    brick:accessedAt bldg:NET_1 .

bldg:VAV_Y_POS a brick:Position_Sensor ;
    brick:isPointOf bldg:VAV_Y ;
    brick:hasUnit unit:PERCENT, unit:UNITLESS ;
    brick:bacnetPoint bldg:VAV_Y_POS_bn .
bldg:VAV_Y_POS_bn brick:hasBacnetDeviceInstance 3000212 ;
    brick:hasBacnetDeviceType "analog-input" ;
    brick:accessedAt bldg:NET_1 .

bldg:BLR_A_HWST a brick:Hot_Water_Supply_Temperature_Sensor ;
    brick:isPointOf bldg:BLR_A ;
    brick:hasUnit unit:DEG_F ;
    brick:bacnetPoint bldg:BLR_A_HWST_bn .
bldg:BLR_A_HWST_bn brick:hasBacnetDeviceInstance "3000001" ;
    brick:hasBacnetDeviceType "analog-input" ;
    brick:accessedAt bldg:NET_1 .

bldg:Air_Zone_X_TEMP a brick:Zone_Air_Temperature_Sensor ;
    brick:isPointOf bldg:Air_Zone_X ;
    brick:bacnetPoint bldg:Air_Zone_X_TEMP_bn .
bldg:Air_Zone_X_TEMP_bn brick:hasBacnetDeviceInstance "3000301" ;
    brick:hasBacnetDeviceType "analog-input" ;
    brick:accessedAt bldg:NET_1 .

bldg:BAD_POINT a brick:Embedded_Temperature_Sensor ;
    brick:isPointOf bldg:VAV_Y ;
    brick:bacnetPoint bldg:BAD_POINT_bn .
bldg:BAD_POINT_bn brick:hasBacnetDeviceInstance "dev-7" ;
    brick:hasBacnetDeviceType "analog-input" ;
    brick:accessedAt bldg:NET_1 .
"#;
